use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MOVIES: &str = "movies";
pub const ATTENDANCE: &str = "attendance";
pub const FAVORITES: &str = "favorites";

/// Rows of the `movies` table are passed through as-is.
pub type MovieRecord = Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub user_id: String,
    pub email: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteRecord {
    pub user_id: String,
    pub movie_id: String,
    pub title: String,
    pub poster_url: String,
    pub created_at: String,
}

/// What a single store call hands back.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub rows: Vec<Value>,
    /// Only set when an exact count was requested and the store reported one.
    pub count: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
