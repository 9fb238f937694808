//! Path resolution with the authentication guard.

use cinema_store::location::{LOGIN_PATH, REGISTER_PATH};
use cinema_store::{AuthStore, Location};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Movies,
    MovieDetail(i64),
    Cinemas,
    CinemaDetail(i64),
    Booking(i64),
    MyBookings,
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Страница {0} не найдена")]
    NotFound(String),

    #[error("Некорректный идентификатор \"{id}\" в пути {path}")]
    InvalidId { path: String, id: String },
}

impl Route {
    /// Resolve a path. `/` resolves to the movie list.
    pub fn parse(path: &str) -> Result<Route, RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::NotFound(path.to_string()));
        }
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] | [""] | ["movies"] => Ok(Route::Movies),
            ["movies", id] => Ok(Route::MovieDetail(parse_id(path, id)?)),
            ["cinemas"] => Ok(Route::Cinemas),
            ["cinemas", id] => Ok(Route::CinemaDetail(parse_id(path, id)?)),
            ["booking", id] => Ok(Route::Booking(parse_id(path, id)?)),
            ["my-bookings"] => Ok(Route::MyBookings),
            ["login"] => Ok(Route::Login),
            ["register"] => Ok(Route::Register),
            _ => Err(RouteError::NotFound(path.to_string())),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Movies => "/movies".to_string(),
            Route::MovieDetail(id) => format!("/movies/{}", id),
            Route::Cinemas => "/cinemas".to_string(),
            Route::CinemaDetail(id) => format!("/cinemas/{}", id),
            Route::Booking(session_id) => format!("/booking/{}", session_id),
            Route::MyBookings => "/my-bookings".to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => REGISTER_PATH.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Movies => "movies",
            Route::MovieDetail(_) => "movie-detail",
            Route::Cinemas => "cinemas",
            Route::CinemaDetail(_) => "cinema-detail",
            Route::Booking(_) => "booking",
            Route::MyBookings => "my-bookings",
            Route::Login => "login",
            Route::Register => "register",
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::MyBookings)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn parse_id(path: &str, raw: &str) -> Result<i64, RouteError> {
    raw.parse().map_err(|_| RouteError::InvalidId {
        path: path.to_string(),
        id: raw.to_string(),
    })
}

/// Moves the shared `Location`, applying guards on the way
pub struct Router {
    auth: Arc<AuthStore>,
    location: Arc<Location>,
}

impl Router {
    pub fn new(auth: Arc<AuthStore>, location: Arc<Location>) -> Self {
        Self { auth, location }
    }

    /// Navigate to `path`, returning the route actually entered
    pub async fn navigate(&self, path: &str) -> Result<Route, RouteError> {
        let requested = Route::parse(path)?;
        let route = if requested.requires_auth() && !self.auth.is_authenticated().await {
            info!(requested = %requested, "Not signed in, redirecting to login");
            Route::Login
        } else {
            requested
        };

        self.location.set(route.path()).await;
        debug!(route = route.name(), "Navigated");
        Ok(route)
    }

    pub async fn current(&self) -> Result<Route, RouteError> {
        Route::parse(&self.location.current().await)
    }
}
