use cinema_core::lookup::find_by_id;
use cinema_core::{ApiError, ApiResult, CinemaApi, Clock, DomainError};
use cinema_shared::{Cinema, CreateBookingRequest, Movie, Seat, SessionDetails};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::StoreStatus;
use crate::request::RequestController;

#[derive(Default)]
struct SessionsState {
    current: Option<SessionDetails>,
    status: StoreStatus,
}

/// The session currently open for seat selection
pub struct SessionsStore {
    api: Arc<dyn CinemaApi>,
    clock: Arc<dyn Clock>,
    state: RwLock<SessionsState>,
    requests: RequestController,
}

impl SessionsStore {
    pub fn new(api: Arc<dyn CinemaApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            state: RwLock::new(SessionsState::default()),
            requests: RequestController::new(),
        }
    }

    pub async fn current_session(&self) -> Option<SessionDetails> {
        self.state.read().await.current.clone()
    }

    pub async fn status(&self) -> StoreStatus {
        self.state.read().await.status.clone()
    }

    /// Fetch a session that can still be booked.
    ///
    /// Sessions that have already started are rejected with `PastSession`
    /// and never replace the current one.
    pub async fn fetch_session(&self, session_id: i64) -> ApiResult<Option<SessionDetails>> {
        self.state.write().await.status.begin();

        let result = self
            .requests
            .track(self.api.session_details(session_id))
            .await
            .and_then(|details| {
                if details.start_time <= self.clock.now() {
                    Err(DomainError::PastSession.into())
                } else {
                    Ok(details)
                }
            });

        let mut state = self.state.write().await;
        match result {
            Ok(details) => {
                info!(session_id, "Session loaded");
                state.current = Some(details.clone());
                state.status.succeed();
                Ok(Some(details))
            }
            Err(ApiError::Cancelled) => {
                debug!(session_id, "Session fetch superseded");
                Ok(state.current.clone())
            }
            Err(e) => {
                warn!(session_id, error = %e, "Failed to load session");
                state.status.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn load_session_for_booking(&self, session_id: i64) -> ApiResult<Option<SessionDetails>> {
        self.fetch_session(session_id).await?;
        Ok(self.current_session().await)
    }

    /// Book `seats` and return the new booking id.
    ///
    /// Rejected locally, before any request, when nothing is selected or the
    /// loaded session has already started.
    pub async fn create_booking(&self, session_id: i64, seats: &[Seat]) -> ApiResult<String> {
        if let Err(e) = self.check_bookable(session_id, seats).await {
            self.state.write().await.status.fail(&e);
            return Err(e);
        }

        self.state.write().await.status.begin();
        let request = CreateBookingRequest {
            seats: seats.to_vec(),
        };
        match self.api.create_booking(session_id, &request).await {
            Ok(created) => {
                info!(session_id, booking_id = %created.id, seats = seats.len(), "Booking created");
                self.state.write().await.status.succeed();
                Ok(created.id)
            }
            Err(e) => {
                warn!(session_id, error = %e, "Failed to create booking");
                self.state.write().await.status.fail(&e);
                Err(e)
            }
        }
    }

    async fn check_bookable(&self, session_id: i64, seats: &[Seat]) -> ApiResult<()> {
        if seats.is_empty() {
            return Err(DomainError::EmptySelection.into());
        }
        let state = self.state.read().await;
        if let Some(current) = state.current.as_ref().filter(|s| s.id == session_id) {
            if current.start_time <= self.clock.now() {
                return Err(DomainError::PastSession.into());
            }
        }
        Ok(())
    }

    pub fn movie_title(&self, movie_id: i64, movies: &[Movie]) -> Option<String> {
        find_by_id(movies, movie_id).map(|m| m.title.clone())
    }

    pub fn cinema_name(&self, cinema_id: i64, cinemas: &[Cinema]) -> Option<String> {
        find_by_id(cinemas, cinema_id).map(|c| c.name.clone())
    }

    pub fn cinema_address(&self, cinema_id: i64, cinemas: &[Cinema]) -> Option<String> {
        find_by_id(cinemas, cinema_id).map(|c| c.address.clone())
    }

    pub async fn clear(&self) {
        self.requests.abort();
        *self.state.write().await = SessionsState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::stub::{cinema, movie, StubApi};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use cinema_core::FixedClock;
    use cinema_shared::SeatLayout;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 1, 12, 0, 0).unwrap()
    }

    fn details(id: i64, start_time: DateTime<Utc>) -> SessionDetails {
        SessionDetails {
            id,
            movie_id: 1,
            cinema_id: 2,
            start_time,
            seats: SeatLayout {
                rows: 5,
                seats_per_row: 8,
            },
            booked_seats: vec![Seat::new(1, 1)],
        }
    }

    fn setup(sessions: Vec<SessionDetails>) -> (Arc<StubApi>, Arc<FixedClock>, SessionsStore) {
        let stub = Arc::new(StubApi::new());
        for s in sessions {
            stub.details.lock().unwrap().insert(s.id, s);
        }
        let clock = Arc::new(FixedClock::new(now()));
        let store = SessionsStore::new(stub.clone(), clock.clone());
        (stub, clock, store)
    }

    #[tokio::test]
    async fn test_fetch_future_session() {
        let future = details(7, now() + Duration::hours(2));
        let (_, _, store) = setup(vec![future.clone()]);

        let loaded = store.fetch_session(7).await.unwrap();

        assert_eq!(loaded, Some(future.clone()));
        assert_eq!(store.current_session().await, Some(future));
        assert_eq!(store.status().await, StoreStatus::default());
    }

    #[tokio::test]
    async fn test_past_session_is_rejected() {
        let future = details(7, now() + Duration::hours(2));
        let past = details(8, now() - Duration::minutes(5));
        let (_, _, store) = setup(vec![future.clone(), past]);
        store.fetch_session(7).await.unwrap();

        let err = store.fetch_session(8).await.unwrap_err();

        assert_eq!(err, ApiError::Domain(DomainError::PastSession));
        assert_eq!(
            store.status().await.error.as_deref(),
            Some("Нельзя забронировать места на прошедший сеанс")
        );
        assert_eq!(store.current_session().await, Some(future));
    }

    #[tokio::test]
    async fn test_session_starting_now_counts_as_past() {
        let (_, _, store) = setup(vec![details(9, now())]);
        let err = store.fetch_session(9).await.unwrap_err();
        assert_eq!(err, ApiError::Domain(DomainError::PastSession));
    }

    #[tokio::test]
    async fn test_missing_session_surfaces_backend_message() {
        let (_, _, store) = setup(vec![]);
        let err = store.load_session_for_booking(404).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(store.status().await.error.as_deref(), Some("Сеанс не найден"));
    }

    #[tokio::test]
    async fn test_empty_selection_never_hits_network() {
        let (stub, _, store) = setup(vec![details(7, now() + Duration::hours(2))]);

        let err = store.create_booking(7, &[]).await.unwrap_err();

        assert_eq!(err, ApiError::Domain(DomainError::EmptySelection));
        assert_eq!(stub.call_count("create_booking:7"), 0);
    }

    #[tokio::test]
    async fn test_booking_rejected_once_session_started() {
        let (stub, clock, store) = setup(vec![details(7, now() + Duration::minutes(1))]);
        store.load_session_for_booking(7).await.unwrap();

        clock.advance(Duration::minutes(2));
        let err = store.create_booking(7, &[Seat::new(2, 3)]).await.unwrap_err();

        assert_eq!(err, ApiError::Domain(DomainError::PastSession));
        assert_eq!(stub.call_count("create_booking:7"), 0);
    }

    #[tokio::test]
    async fn test_create_booking_returns_id() {
        let (stub, _, store) = setup(vec![details(7, now() + Duration::hours(2))]);
        store.load_session_for_booking(7).await.unwrap();

        let id = store
            .create_booking(7, &[Seat::new(2, 3), Seat::new(2, 4)])
            .await
            .unwrap();

        assert_eq!(id, "booking-1");
        let booked = stub.bookings.lock().unwrap().clone();
        assert_eq!(booked[0].seats, vec![Seat::new(2, 3), Seat::new(2, 4)]);
    }

    #[test]
    fn test_lookups() {
        let (_, _, store) = setup(vec![]);
        let movies = vec![movie(1, "Дюна")];
        let cinemas = vec![cinema(2, "Октябрь")];

        assert_eq!(store.movie_title(1, &movies).as_deref(), Some("Дюна"));
        assert_eq!(store.cinema_name(2, &cinemas).as_deref(), Some("Октябрь"));
        assert_eq!(store.cinema_address(2, &cinemas).as_deref(), Some("Улица 2"));
        assert_eq!(store.movie_title(5, &movies), None);
    }
}
