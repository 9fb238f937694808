pub mod api;
pub mod booking;
pub mod clock;
pub mod countdown;
pub mod error;
pub mod format;
pub mod lookup;
pub mod schedule;
pub mod seating;
pub mod validation;

pub use api::CinemaApi;
pub use booking::{BookingStage, DEFAULT_PAYMENT_WINDOW_SECONDS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ApiError, DomainError, GENERIC_ERROR_MESSAGE};
pub use seating::{SeatError, SeatGrid, SeatState};
pub use validation::ValidationError;

pub type ApiResult<T> = Result<T, ApiError>;
