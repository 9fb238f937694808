use cinema_core::validation::{validate_password, validate_password_confirmation, validate_username};
use cinema_core::{ApiResult, CinemaApi};
use cinema_shared::Credentials;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{AuthStore, StoreStatus};

/// Login and registration against the backend, storing the issued token
pub struct AccountStore {
    api: Arc<dyn CinemaApi>,
    auth: Arc<AuthStore>,
    status: RwLock<StoreStatus>,
}

impl AccountStore {
    pub fn new(api: Arc<dyn CinemaApi>, auth: Arc<AuthStore>) -> Self {
        Self {
            api,
            auth,
            status: RwLock::new(StoreStatus::default()),
        }
    }

    pub async fn status(&self) -> StoreStatus {
        self.status.read().await.clone()
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        let credentials = Credentials::new(username, password);
        let result = self.authenticate(&credentials, None).await;
        self.finish(&credentials, "Logged in", result).await
    }

    /// Validates all three fields before anything is sent
    pub async fn register(&self, username: &str, password: &str, confirmation: &str) -> ApiResult<()> {
        let credentials = Credentials::new(username, password);
        let result = self.authenticate(&credentials, Some(confirmation)).await;
        self.finish(&credentials, "Registered", result).await
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
        *self.status.write().await = StoreStatus::default();
    }

    /// Registers when a confirmation is given, logs in otherwise
    async fn authenticate(&self, credentials: &Credentials, confirmation: Option<&str>) -> ApiResult<String> {
        validate_username(&credentials.username)?;
        validate_password(credentials.password.expose())?;
        if let Some(confirmation) = confirmation {
            validate_password_confirmation(credentials.password.expose(), confirmation)?;
        }

        self.status.write().await.begin();
        let token = match confirmation {
            Some(_) => self.api.register(credentials).await?,
            None => self.api.login(credentials).await?,
        };
        Ok(token.token.into_inner())
    }

    async fn finish(&self, credentials: &Credentials, action: &str, result: ApiResult<String>) -> ApiResult<()> {
        match result {
            Ok(token) => {
                self.auth.set_token(token).await;
                self.status.write().await.succeed();
                info!(username = %credentials.username, "{}", action);
                Ok(())
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Authentication failed");
                self.status.write().await.fail(&e);
                Err(e)
            }
        }
    }
}
