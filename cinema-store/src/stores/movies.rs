use cinema_core::format::format_cinema_name;
use cinema_core::lookup::find_by_id;
use cinema_core::{ApiError, ApiResult, CinemaApi};
use cinema_shared::{Cinema, Movie, MovieSession};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::StoreStatus;
use crate::request::RequestController;

/// A movie page: the movie (if known) and its sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieDetail {
    pub movie: Option<Movie>,
    pub sessions: Vec<MovieSession>,
}

#[derive(Default)]
struct MoviesState {
    movies: Vec<Movie>,
    status: StoreStatus,
}

pub struct MoviesStore {
    api: Arc<dyn CinemaApi>,
    state: RwLock<MoviesState>,
    requests: RequestController,
}

impl MoviesStore {
    pub fn new(api: Arc<dyn CinemaApi>) -> Self {
        Self {
            api,
            state: RwLock::new(MoviesState::default()),
            requests: RequestController::new(),
        }
    }

    pub async fn movies(&self) -> Vec<Movie> {
        self.state.read().await.movies.clone()
    }

    pub async fn status(&self) -> StoreStatus {
        self.state.read().await.status.clone()
    }

    /// Fetch the catalogue, served from cache unless `force` or nothing is cached yet.
    ///
    /// A superseded fetch resolves to whatever is cached at that point.
    pub async fn fetch_movies(&self, force: bool) -> ApiResult<Vec<Movie>> {
        {
            let mut state = self.state.write().await;
            if !force && !state.movies.is_empty() {
                return Ok(state.movies.clone());
            }
            state.status.begin();
        }

        match self.requests.track(self.api.list_movies()).await {
            Ok(movies) => {
                let mut state = self.state.write().await;
                state.movies = movies.clone();
                state.status.succeed();
                info!(count = movies.len(), "Movies loaded");
                Ok(movies)
            }
            Err(ApiError::Cancelled) => {
                debug!("Movies fetch superseded");
                Ok(self.movies().await)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load movies");
                self.state.write().await.status.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn fetch_movie_sessions(&self, movie_id: i64) -> ApiResult<Vec<MovieSession>> {
        match self.api.movie_sessions(movie_id).await {
            Ok(sessions) => {
                debug!(movie_id, count = sessions.len(), "Movie sessions loaded");
                Ok(sessions)
            }
            Err(e) => {
                warn!(movie_id, error = %e, "Failed to load movie sessions");
                self.state.write().await.status.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn movie_by_id(&self, id: i64) -> Option<Movie> {
        let state = self.state.read().await;
        find_by_id(&state.movies, id).cloned()
    }

    /// Movie plus its sessions. Sessions are only requested for a known movie.
    pub async fn load_movie_detail(&self, id: i64) -> ApiResult<MovieDetail> {
        self.fetch_movies(false).await?;

        let Some(movie) = self.movie_by_id(id).await else {
            debug!(movie_id = id, "Movie not in catalogue");
            return Ok(MovieDetail::default());
        };

        let sessions = self.fetch_movie_sessions(id).await?;
        Ok(MovieDetail {
            movie: Some(movie),
            sessions,
        })
    }

    pub fn cinema_name(&self, cinema_id: i64, cinemas: &[Cinema]) -> Option<String> {
        find_by_id(cinemas, cinema_id).map(|c| format_cinema_name(&c.name))
    }

    /// Drop the cached catalogue and cancel any fetch in flight
    pub async fn invalidate(&self) {
        self.requests.abort();
        let mut state = self.state.write().await;
        state.movies.clear();
        state.status = StoreStatus::default();
    }

    /// Cancel the in-flight fetch, keeping the cache
    pub async fn cancel(&self) {
        self.requests.abort();
        self.state.write().await.status.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::stub::{cinema, movie, session, StubApi};
    use chrono::{TimeZone, Utc};

    fn store_with(stub: &Arc<StubApi>) -> Arc<MoviesStore> {
        Arc::new(MoviesStore::new(stub.clone()))
    }

    #[tokio::test]
    async fn test_fetch_movies_caches() {
        let stub = Arc::new(StubApi::new());
        *stub.movies.lock().unwrap() = vec![movie(1, "Дюна")];
        let store = store_with(&stub);

        let first = store.fetch_movies(false).await.unwrap();
        let second = store.fetch_movies(false).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(stub.call_count("list_movies"), 1);
        assert!(!store.status().await.loading);
    }

    #[tokio::test]
    async fn test_force_refetches() {
        let stub = Arc::new(StubApi::new());
        *stub.movies.lock().unwrap() = vec![movie(1, "Дюна")];
        let store = store_with(&stub);
        store.fetch_movies(false).await.unwrap();

        stub.movies.lock().unwrap().push(movie(2, "Солярис"));
        let movies = store.fetch_movies(true).await.unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(stub.call_count("list_movies"), 2);
    }

    #[tokio::test]
    async fn test_failure_sets_error_and_keeps_cache() {
        let stub = Arc::new(StubApi::new());
        *stub.movies.lock().unwrap() = vec![movie(1, "Дюна")];
        let store = store_with(&stub);
        store.fetch_movies(false).await.unwrap();

        stub.fail_with(ApiError::Http {
            status: 500,
            message: Some("Сервер недоступен".into()),
        });
        let result = store.fetch_movies(true).await;

        assert!(result.is_err());
        let status = store.status().await;
        assert!(!status.loading);
        assert_eq!(status.error.as_deref(), Some("Сервер недоступен"));
        assert_eq!(store.movies().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_returns_cached_list() {
        let stub = Arc::new(StubApi::new());
        *stub.movies.lock().unwrap() = vec![movie(1, "Дюна")];
        let store = store_with(&stub);
        store.fetch_movies(false).await.unwrap();

        *stub.movies.lock().unwrap() = vec![movie(9, "Новый")];
        let (_release, started) = stub.hold_next();
        let pending = {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_movies(true).await })
        };
        started.await.unwrap();

        store.cancel().await;

        let movies = pending.await.unwrap().unwrap();
        assert_eq!(movies, vec![movie(1, "Дюна")]);
        assert_eq!(store.status().await.error, None);
    }

    #[tokio::test]
    async fn test_unknown_movie_detail_skips_sessions_request() {
        let stub = Arc::new(StubApi::new());
        *stub.movies.lock().unwrap() = vec![movie(1, "Дюна")];
        let store = store_with(&stub);

        let detail = store.load_movie_detail(42).await.unwrap();

        assert_eq!(detail, MovieDetail::default());
        assert_eq!(stub.calls(), vec!["list_movies".to_string()]);
    }

    #[tokio::test]
    async fn test_movie_detail_with_sessions() {
        let stub = Arc::new(StubApi::new());
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 18, 0, 0).unwrap();
        *stub.movies.lock().unwrap() = vec![movie(1, "Дюна")];
        *stub.sessions.lock().unwrap() = vec![session(10, 1, 5, start), session(11, 2, 5, start)];
        let store = store_with(&stub);

        let detail = store.load_movie_detail(1).await.unwrap();

        assert_eq!(detail.movie.map(|m| m.title), Some("Дюна".to_string()));
        assert_eq!(detail.sessions.len(), 1);
        assert_eq!(detail.sessions[0].id, 10);
    }

    #[test]
    fn test_cinema_name_is_formatted() {
        let store = MoviesStore::new(Arc::new(StubApi::new()));
        let cinemas = vec![cinema(3, "КИНО МАКС")];
        assert_eq!(store.cinema_name(3, &cinemas).as_deref(), Some("Кино макс"));
        assert_eq!(store.cinema_name(4, &cinemas), None);
    }
}
