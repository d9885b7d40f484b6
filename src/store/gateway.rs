use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::postgrest::PostgrestStore;
use super::repo::Store;
use crate::config::StoreSettings;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("store not configured, missing: {}", .missing.join(", "))]
    NotConfigured { missing: Vec<&'static str> },
    #[error("store client unavailable: {0}")]
    Unavailable(String),
}

/// Hands out the shared store handle.
///
/// Nothing is built at startup. The first caller resolves the settings and
/// constructs the client; every later caller gets the same handle.
pub struct StoreGateway {
    settings: StoreSettings,
    handle: OnceCell<Arc<dyn Store>>,
}

impl StoreGateway {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            handle: OnceCell::new(),
        }
    }

    /// A gateway that already holds a handle.
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self {
            settings: StoreSettings::default(),
            handle: OnceCell::from(store),
        }
    }

    pub async fn handle(&self) -> Result<Arc<dyn Store>, GatewayError> {
        let handle = self
            .handle
            .get_or_try_init(|| async { self.connect() })
            .await?;
        Ok(handle.clone())
    }

    fn connect(&self) -> Result<Arc<dyn Store>, GatewayError> {
        let url = self.settings.url();
        let key = self.settings.credential();

        let (url, key) = match (url, key) {
            (Some(url), Some(key)) => (url, key),
            _ => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push("SUPABASE_URL");
                }
                if key.is_none() {
                    missing.push("SUPABASE_SERVICE_ROLE_KEY");
                }
                warn!(missing = ?missing, "store requested but not configured");
                return Err(GatewayError::NotConfigured { missing });
            }
        };

        let timeout = Duration::from_secs(self.settings.timeout_secs);
        let store = PostgrestStore::new(url, key, timeout)
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        info!("Store client initialized for {}", url);
        Ok(Arc::new(store))
    }
}
