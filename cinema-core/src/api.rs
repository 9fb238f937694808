use async_trait::async_trait;
use cinema_shared::{
    AuthToken, Booking, BookingCreated, Cinema, CreateBookingRequest, Credentials, Movie,
    MovieSession, SessionDetails, Settings,
};

use crate::ApiResult;

/// Port to the booking backend, one method per REST endpoint
#[async_trait]
pub trait CinemaApi: Send + Sync {
    /// GET /movies
    async fn list_movies(&self) -> ApiResult<Vec<Movie>>;

    /// GET /movies/:id/sessions
    async fn movie_sessions(&self, movie_id: i64) -> ApiResult<Vec<MovieSession>>;

    /// GET /cinemas
    async fn list_cinemas(&self) -> ApiResult<Vec<Cinema>>;

    /// GET /cinemas/:id/sessions
    async fn cinema_sessions(&self, cinema_id: i64) -> ApiResult<Vec<MovieSession>>;

    /// GET /movieSessions/:id
    async fn session_details(&self, session_id: i64) -> ApiResult<SessionDetails>;

    /// POST /movieSessions/:id/bookings
    async fn create_booking(
        &self,
        session_id: i64,
        request: &CreateBookingRequest,
    ) -> ApiResult<BookingCreated>;

    /// GET /me/bookings
    async fn my_bookings(&self) -> ApiResult<Vec<Booking>>;

    /// POST /bookings/:id/payments
    async fn pay_booking(&self, booking_id: &str) -> ApiResult<()>;

    /// GET /settings
    async fn settings(&self) -> ApiResult<Settings>;

    /// POST /login
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken>;

    /// POST /register
    async fn register(&self, credentials: &Credentials) -> ApiResult<AuthToken>;
}
