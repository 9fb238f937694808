use cinema_shared::Masked;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::storage::TokenStorage;

/// Bearer token state, mirrored to persistent storage.
///
/// Storage failures are logged and swallowed; the in-memory token stays authoritative.
pub struct AuthStore {
    storage: Arc<dyn TokenStorage>,
    token: RwLock<Option<Masked<String>>>,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let token = load_stored(storage.as_ref());
        Self {
            storage,
            token: RwLock::new(token),
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.as_ref().map(|t| t.expose().clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        let token = Masked::new(token.into());
        if let Err(e) = self.storage.save(token.expose()) {
            warn!(error = %e, "Failed to persist auth token");
        }
        *self.token.write().await = Some(token);
        info!("Auth token set");
    }

    pub async fn clear_token(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to remove persisted auth token");
        }
        *self.token.write().await = None;
        info!("Auth token cleared");
    }

    pub async fn logout(&self) {
        self.clear_token().await;
    }

    /// Re-read the persisted token, keeping the current one if storage is empty
    pub async fn restore_token(&self) {
        if let Some(token) = load_stored(self.storage.as_ref()) {
            *self.token.write().await = Some(token);
        }
    }
}

fn load_stored(storage: &dyn TokenStorage) -> Option<Masked<String>> {
    match storage.load() {
        Ok(token) => token.map(Masked::new),
        Err(e) => {
            warn!(error = %e, "Failed to read persisted auth token");
            None
        }
    }
}
