use cinema_core::{ApiError, SeatError};
use cinema_shared::Seat;
use thiserror::Error;

use crate::router::RouteError;

/// Failures surfaced by CLI commands
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("Схема зала недоступна: {0}")]
    Seat(#[from] SeatError),

    #[error("Некорректное место \"{0}\", ожидается РЯД:МЕСТО")]
    InvalidSeat(String),

    #[error("Место {}:{} уже занято", .0.row_number, .0.seat_number)]
    SeatTaken(Seat),

    #[error("Фильм {0} не найден")]
    MovieNotFound(i64),

    #[error("Кинотеатр {0} не найден")]
    CinemaNotFound(i64),

    #[error("Бронирование {0} не найдено")]
    BookingNotFound(String),

    #[error("Время оплаты бронирования {0} истекло")]
    PaymentWindowClosed(String),

    #[error("Требуется вход в систему")]
    AuthenticationRequired,

    #[error("Output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Superseded requests are not failures worth reporting
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Api(err) if err.is_cancelled())
    }
}
