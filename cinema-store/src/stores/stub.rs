//! In-process backend double for store tests.

use async_trait::async_trait;
use cinema_core::{ApiError, ApiResult, CinemaApi};
use cinema_shared::{
    AuthToken, Booking, BookingCreated, Cinema, CreateBookingRequest, Credentials, Masked, Movie,
    MovieSession, SessionDetails, Settings,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

#[derive(Default)]
pub(crate) struct StubApi {
    pub movies: Mutex<Vec<Movie>>,
    pub cinemas: Mutex<Vec<Cinema>>,
    pub sessions: Mutex<Vec<MovieSession>>,
    pub details: Mutex<HashMap<i64, SessionDetails>>,
    pub bookings: Mutex<Vec<Booking>>,
    pub settings: Mutex<Option<Settings>>,
    pub failure: Mutex<Option<ApiError>>,
    pub calls: Mutex<Vec<String>>,
    hold: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call block until released.
    ///
    /// Returns (release, started): `started` resolves once the call is in flight.
    pub fn hold_next(&self) -> (oneshot::Sender<()>, oneshot::Receiver<()>) {
        let (release_tx, release_rx) = oneshot::channel();
        let (started_tx, started_rx) = oneshot::channel();
        *self.hold.lock().unwrap() = Some((started_tx, release_rx));
        (release_tx, started_rx)
    }

    pub fn fail_with(&self, err: ApiError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == name).count()
    }

    async fn enter(&self, call: String) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        let hold = self.hold.lock().unwrap().take();
        if let Some((started, release)) = hold {
            let _ = started.send(());
            let _ = release.await;
        }
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CinemaApi for StubApi {
    async fn list_movies(&self) -> ApiResult<Vec<Movie>> {
        self.enter("list_movies".into()).await?;
        Ok(self.movies.lock().unwrap().clone())
    }

    async fn movie_sessions(&self, movie_id: i64) -> ApiResult<Vec<MovieSession>> {
        self.enter(format!("movie_sessions:{}", movie_id)).await?;
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.iter().filter(|s| s.movie_id == movie_id).cloned().collect())
    }

    async fn list_cinemas(&self) -> ApiResult<Vec<Cinema>> {
        self.enter("list_cinemas".into()).await?;
        Ok(self.cinemas.lock().unwrap().clone())
    }

    async fn cinema_sessions(&self, cinema_id: i64) -> ApiResult<Vec<MovieSession>> {
        self.enter(format!("cinema_sessions:{}", cinema_id)).await?;
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.iter().filter(|s| s.cinema_id == cinema_id).cloned().collect())
    }

    async fn session_details(&self, session_id: i64) -> ApiResult<SessionDetails> {
        self.enter(format!("session_details:{}", session_id)).await?;
        self.details
            .lock()
            .unwrap()
            .get(&session_id)
            .cloned()
            .ok_or(ApiError::Http { status: 404, message: Some("Сеанс не найден".into()) })
    }

    async fn create_booking(&self, session_id: i64, request: &CreateBookingRequest) -> ApiResult<BookingCreated> {
        self.enter(format!("create_booking:{}", session_id)).await?;
        let id = format!("booking-{}", self.bookings.lock().unwrap().len() + 1);
        self.bookings.lock().unwrap().push(Booking {
            id: id.clone(),
            movie_session_id: session_id,
            booked_at: Utc::now(),
            seats: request.seats.clone(),
            is_paid: false,
        });
        Ok(BookingCreated { id })
    }

    async fn my_bookings(&self) -> ApiResult<Vec<Booking>> {
        self.enter("my_bookings".into()).await?;
        Ok(self.bookings.lock().unwrap().clone())
    }

    async fn pay_booking(&self, booking_id: &str) -> ApiResult<()> {
        self.enter(format!("pay_booking:{}", booking_id)).await?;
        Ok(())
    }

    async fn settings(&self) -> ApiResult<Settings> {
        self.enter("settings".into()).await?;
        let settings = *self.settings.lock().unwrap();
        settings.ok_or(ApiError::Http { status: 500, message: None })
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        self.enter(format!("login:{}", credentials.username)).await?;
        Ok(AuthToken { token: Masked::from("login-token") })
    }

    async fn register(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        self.enter(format!("register:{}", credentials.username)).await?;
        Ok(AuthToken { token: Masked::from("register-token") })
    }
}

pub(crate) fn movie(id: i64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        year: 2024,
        rating: 7.5,
        poster_image: format!("/posters/{}.jpg", id),
        length_minutes: 120,
        description: String::new(),
    }
}

pub(crate) fn cinema(id: i64, name: &str) -> Cinema {
    Cinema {
        id,
        name: name.to_string(),
        address: format!("Улица {}", id),
    }
}

pub(crate) fn session(id: i64, movie_id: i64, cinema_id: i64, start_time: DateTime<Utc>) -> MovieSession {
    MovieSession { id, movie_id, cinema_id, start_time }
}
