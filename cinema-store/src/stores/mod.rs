pub mod account;
pub mod auth;
pub mod bookings;
pub mod cinemas;
pub mod movies;
pub mod sessions;

#[cfg(test)]
pub(crate) mod stub;

pub use account::AccountStore;
pub use auth::AuthStore;
pub use bookings::BookingsStore;
pub use cinemas::{CinemaDetail, CinemasStore};
pub use movies::{MovieDetail, MoviesStore};
pub use sessions::SessionsStore;

use cinema_core::ApiError;

/// Loading flag and last user-facing error of one store
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreStatus {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self) {
        self.loading = false;
    }

    pub(crate) fn fail(&mut self, err: &ApiError) {
        self.loading = false;
        self.error = Some(err.user_message());
    }
}
