pub mod gateway;
#[cfg(test)]
pub mod memory;
pub mod model;
pub mod postgrest;
pub mod query;
pub mod repo;

pub use gateway::*;
pub use model::*;
pub use postgrest::PostgrestStore;
pub use query::*;
pub use repo::*;
