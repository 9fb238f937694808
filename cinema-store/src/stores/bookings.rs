use chrono::{DateTime, Utc};
use cinema_core::booking::{self, BookingStage};
use cinema_core::lookup;
use cinema_core::{ApiError, ApiResult, CinemaApi, Clock};
use cinema_shared::{Booking, Cinema, Movie, MovieSession, Settings};
use futures_util::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::StoreStatus;
use crate::request::RequestController;

#[derive(Default)]
struct BookingsState {
    bookings: Vec<Booking>,
    sessions: Vec<MovieSession>,
    settings: Option<Settings>,
    status: StoreStatus,
}

/// The signed-in user's bookings and the sessions they refer to
pub struct BookingsStore {
    api: Arc<dyn CinemaApi>,
    clock: Arc<dyn Clock>,
    default_payment_seconds: i64,
    state: RwLock<BookingsState>,
    requests: RequestController,
}

impl BookingsStore {
    pub fn new(api: Arc<dyn CinemaApi>, clock: Arc<dyn Clock>, default_payment_seconds: i64) -> Self {
        Self {
            api,
            clock,
            default_payment_seconds,
            state: RwLock::new(BookingsState::default()),
            requests: RequestController::new(),
        }
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.state.read().await.bookings.clone()
    }

    pub async fn movie_sessions(&self) -> Vec<MovieSession> {
        self.state.read().await.sessions.clone()
    }

    pub async fn settings(&self) -> Option<Settings> {
        self.state.read().await.settings
    }

    pub async fn status(&self) -> StoreStatus {
        self.state.read().await.status.clone()
    }

    pub async fn fetch_bookings(&self, force: bool) -> ApiResult<Vec<Booking>> {
        {
            let mut state = self.state.write().await;
            if !force && !state.bookings.is_empty() && !state.status.loading {
                return Ok(state.bookings.clone());
            }
            state.status.begin();
        }

        match self.requests.track(self.api.my_bookings()).await {
            Ok(bookings) => {
                let mut state = self.state.write().await;
                state.bookings = bookings.clone();
                state.status.succeed();
                info!(count = bookings.len(), "Bookings loaded");
                Ok(bookings)
            }
            Err(ApiError::Cancelled) => {
                debug!("Bookings fetch superseded");
                Ok(self.bookings().await)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load bookings");
                self.state.write().await.status.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn fetch_settings(&self, force: bool) -> ApiResult<Settings> {
        if !force {
            if let Some(settings) = self.settings().await {
                return Ok(settings);
            }
        }
        match self.api.settings().await {
            Ok(settings) => {
                debug!(payment_seconds = settings.booking_payment_time_seconds, "Settings loaded");
                self.state.write().await.settings = Some(settings);
                Ok(settings)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load settings");
                self.state.write().await.status.fail(&e);
                Err(e)
            }
        }
    }

    /// Fetch all sessions concurrently; the stored list is replaced only if every request succeeds
    pub async fn fetch_session_details(&self, session_ids: &[i64]) -> ApiResult<Vec<MovieSession>> {
        let details = match try_join_all(session_ids.iter().map(|id| self.api.session_details(*id))).await {
            Ok(details) => details,
            Err(e) => {
                warn!(count = session_ids.len(), error = %e, "Failed to load booked sessions");
                self.state.write().await.status.fail(&e);
                return Err(e);
            }
        };
        let sessions: Vec<MovieSession> = details.iter().map(|d| d.session()).collect();
        self.state.write().await.sessions = sessions.clone();
        Ok(sessions)
    }

    pub async fn pay_booking(&self, booking_id: &str) -> ApiResult<()> {
        if let Err(e) = self.api.pay_booking(booking_id).await {
            warn!(booking_id, error = %e, "Payment failed");
            self.state.write().await.status.fail(&e);
            return Err(e);
        }

        let mut state = self.state.write().await;
        if let Some(booking) = state.bookings.iter_mut().find(|b| b.id == booking_id) {
            booking.is_paid = true;
        }
        info!(booking_id, "Booking paid");
        Ok(())
    }

    pub async fn remove_booking(&self, booking_id: &str) -> Option<Booking> {
        let mut state = self.state.write().await;
        let index = state.bookings.iter().position(|b| b.id == booking_id)?;
        Some(state.bookings.remove(index))
    }

    /// Drop bookings whose payment window closed, returning their ids
    pub async fn purge_expired(&self) -> Vec<String> {
        let window = self.payment_time_seconds().await;
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let (expired, kept): (Vec<Booking>, Vec<Booking>) = std::mem::take(&mut state.bookings)
            .into_iter()
            .partition(|b| booking::is_expired_unpaid(b, window, now));
        state.bookings = kept;

        let ids: Vec<String> = expired.into_iter().map(|b| b.id).collect();
        if !ids.is_empty() {
            info!(count = ids.len(), "Expired bookings removed");
        }
        ids
    }

    /// Payment window from settings, the configured default until they arrive
    pub async fn payment_time_seconds(&self) -> i64 {
        self.settings()
            .await
            .map(|s| s.booking_payment_time_seconds)
            .filter(|seconds| *seconds > 0)
            .unwrap_or(self.default_payment_seconds)
    }

    pub async fn unpaid_bookings(&self) -> Vec<Booking> {
        let window = self.payment_time_seconds().await;
        let now = self.clock.now();
        let state = self.state.read().await;
        state
            .bookings
            .iter()
            .filter(|b| booking::is_unpaid(b, window, now))
            .cloned()
            .collect()
    }

    pub async fn upcoming_bookings(&self) -> Vec<Booking> {
        let now = self.clock.now();
        let state = self.state.read().await;
        let sessions = booking::session_map(&state.sessions);
        state
            .bookings
            .iter()
            .filter(|b| booking::is_upcoming(b, sessions.get(&b.movie_session_id).copied(), now))
            .cloned()
            .collect()
    }

    pub async fn past_bookings(&self) -> Vec<Booking> {
        let now = self.clock.now();
        let state = self.state.read().await;
        let sessions = booking::session_map(&state.sessions);
        state
            .bookings
            .iter()
            .filter(|b| booking::is_past(sessions.get(&b.movie_session_id).copied(), now))
            .cloned()
            .collect()
    }

    pub async fn has_expired_unpaid(&self) -> bool {
        let window = self.payment_time_seconds().await;
        let state = self.state.read().await;
        booking::has_expired_unpaid(&state.bookings, window, self.clock.now())
    }

    pub async fn stage_of(&self, booking: &Booking) -> BookingStage {
        let window = self.payment_time_seconds().await;
        let state = self.state.read().await;
        let session = lookup::find_by_id(&state.sessions, booking.movie_session_id);
        booking::classify(booking, session, window, self.clock.now())
    }

    pub async fn movie_title(&self, session_id: i64, movies: &[Movie]) -> Option<String> {
        let state = self.state.read().await;
        lookup::movie_title(session_id, movies, &state.sessions).map(str::to_string)
    }

    pub async fn movie_poster(&self, session_id: i64, movies: &[Movie]) -> Option<String> {
        let state = self.state.read().await;
        lookup::movie_poster(session_id, movies, &state.sessions).map(str::to_string)
    }

    pub async fn cinema_name(&self, session_id: i64, cinemas: &[Cinema]) -> Option<String> {
        let state = self.state.read().await;
        lookup::cinema_name(session_id, cinemas, &state.sessions).map(str::to_string)
    }

    pub async fn session_start_time(&self, session_id: i64) -> Option<DateTime<Utc>> {
        let state = self.state.read().await;
        lookup::session_start_time(session_id, &state.sessions)
    }

    /// Bookings (forced) and settings together, then the sessions they reference.
    ///
    /// A failure part-way leaves whatever was already applied in place.
    pub async fn load_all_data(&self) -> ApiResult<()> {
        tokio::try_join!(self.fetch_bookings(true), self.fetch_settings(false))?;

        let mut seen = HashSet::new();
        let session_ids: Vec<i64> = self
            .bookings()
            .await
            .iter()
            .map(|b| b.movie_session_id)
            .filter(|id| seen.insert(*id))
            .collect();
        if session_ids.is_empty() {
            return Ok(());
        }

        self.fetch_session_details(&session_ids).await?;
        Ok(())
    }

    pub async fn initialize_bookings_page(&self) -> ApiResult<()> {
        self.load_all_data().await
    }

    pub async fn clear(&self) {
        self.requests.abort();
        *self.state.write().await = BookingsState::default();
    }
}
