use cinema_core::{ApiResult, CinemaApi, Clock, SystemClock};
use std::sync::Arc;
use tracing::info;

use crate::app_config::Config;
use crate::http::HttpClient;
use crate::location::Location;
use crate::storage::{FileTokenStorage, TokenStorage};
use crate::stores::{AccountStore, AuthStore, BookingsStore, CinemasStore, MoviesStore, SessionsStore};

/// Every store of the client, sharing one backend connection
pub struct RootStore {
    pub auth: Arc<AuthStore>,
    pub account: AccountStore,
    pub movies: MoviesStore,
    pub cinemas: CinemasStore,
    pub sessions: SessionsStore,
    pub bookings: BookingsStore,
    pub location: Arc<Location>,
    pub clock: Arc<dyn Clock>,
    api: Arc<dyn CinemaApi>,
    base_url: String,
}

impl RootStore {
    /// Production wiring: file-backed token, HTTP backend, wall clock
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let storage = Arc::new(FileTokenStorage::new(&config.storage.token_path));
        Self::with_storage(config, storage, Arc::new(SystemClock))
    }

    pub fn with_storage(config: &Config, storage: Arc<dyn TokenStorage>, clock: Arc<dyn Clock>) -> ApiResult<Self> {
        let auth = Arc::new(AuthStore::new(storage));
        let location = Arc::new(Location::default());
        let client = HttpClient::new(&config.api, auth.clone(), location.clone())?;
        info!(base_url = %client.base_url(), "Backend client ready");

        let base_url = client.base_url().to_string();
        Ok(Self::assemble(
            Arc::new(client),
            auth,
            location,
            clock,
            config.booking.default_payment_seconds,
            base_url,
        ))
    }

    /// Assemble around any backend, used with test doubles
    pub fn with_api(
        api: Arc<dyn CinemaApi>,
        auth: Arc<AuthStore>,
        clock: Arc<dyn Clock>,
        default_payment_seconds: i64,
    ) -> Self {
        Self::assemble(api, auth, Arc::new(Location::default()), clock, default_payment_seconds, String::new())
    }

    fn assemble(
        api: Arc<dyn CinemaApi>,
        auth: Arc<AuthStore>,
        location: Arc<Location>,
        clock: Arc<dyn Clock>,
        default_payment_seconds: i64,
        base_url: String,
    ) -> Self {
        Self {
            account: AccountStore::new(api.clone(), auth.clone()),
            movies: MoviesStore::new(api.clone()),
            cinemas: CinemasStore::new(api.clone()),
            sessions: SessionsStore::new(api.clone(), clock.clone()),
            bookings: BookingsStore::new(api.clone(), clock.clone(), default_payment_seconds),
            location,
            auth,
            clock,
            api,
            base_url,
        }
    }

    pub fn api(&self) -> &Arc<dyn CinemaApi> {
        &self.api
    }

    /// Backend origin, used to resolve poster paths
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sign out and forget everything tied to the previous user
    pub async fn logout(&self) {
        self.account.logout().await;
        self.bookings.clear().await;
        self.sessions.clear().await;
    }
}
