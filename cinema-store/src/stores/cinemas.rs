use cinema_core::lookup::find_by_id;
use cinema_core::{ApiError, ApiResult, CinemaApi};
use cinema_shared::{Cinema, MovieSession};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::StoreStatus;
use crate::request::RequestController;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CinemaDetail {
    pub cinema: Option<Cinema>,
    pub sessions: Vec<MovieSession>,
}

#[derive(Default)]
struct CinemasState {
    cinemas: Vec<Cinema>,
    status: StoreStatus,
}

pub struct CinemasStore {
    api: Arc<dyn CinemaApi>,
    state: RwLock<CinemasState>,
    requests: RequestController,
}

impl CinemasStore {
    pub fn new(api: Arc<dyn CinemaApi>) -> Self {
        Self {
            api,
            state: RwLock::new(CinemasState::default()),
            requests: RequestController::new(),
        }
    }

    pub async fn cinemas(&self) -> Vec<Cinema> {
        self.state.read().await.cinemas.clone()
    }

    pub async fn status(&self) -> StoreStatus {
        self.state.read().await.status.clone()
    }

    pub async fn fetch_cinemas(&self, force: bool) -> ApiResult<Vec<Cinema>> {
        {
            let mut state = self.state.write().await;
            if !force && !state.cinemas.is_empty() {
                return Ok(state.cinemas.clone());
            }
            state.status.begin();
        }

        match self.requests.track(self.api.list_cinemas()).await {
            Ok(cinemas) => {
                let mut state = self.state.write().await;
                state.cinemas = cinemas.clone();
                state.status.succeed();
                info!(count = cinemas.len(), "Cinemas loaded");
                Ok(cinemas)
            }
            Err(ApiError::Cancelled) => {
                debug!("Cinemas fetch superseded");
                Ok(self.cinemas().await)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load cinemas");
                self.state.write().await.status.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn fetch_cinema_sessions(&self, cinema_id: i64) -> ApiResult<Vec<MovieSession>> {
        match self.api.cinema_sessions(cinema_id).await {
            Ok(sessions) => {
                debug!(cinema_id, count = sessions.len(), "Cinema sessions loaded");
                Ok(sessions)
            }
            Err(e) => {
                warn!(cinema_id, error = %e, "Failed to load cinema sessions");
                self.state.write().await.status.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn cinema_by_id(&self, id: i64) -> Option<Cinema> {
        let state = self.state.read().await;
        find_by_id(&state.cinemas, id).cloned()
    }

    pub async fn load_cinema_detail(&self, id: i64) -> ApiResult<CinemaDetail> {
        self.fetch_cinemas(false).await?;

        let Some(cinema) = self.cinema_by_id(id).await else {
            return Ok(CinemaDetail::default());
        };

        let sessions = match self.fetch_cinema_sessions(id).await {
            Ok(sessions) => sessions,
            Err(e) => {
                self.state.write().await.status.fail(&e);
                return Err(e);
            }
        };
        Ok(CinemaDetail {
            cinema: Some(cinema),
            sessions,
        })
    }

    pub async fn invalidate(&self) {
        self.requests.abort();
        let mut state = self.state.write().await;
        state.cinemas.clear();
        state.status = StoreStatus::default();
    }

    pub async fn cancel(&self) {
        self.requests.abort();
        self.state.write().await.status.loading = false;
    }
}
