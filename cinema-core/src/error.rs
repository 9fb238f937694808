use crate::validation::ValidationError;

/// Fallback shown when a failure carries no message meant for the user
pub const GENERIC_ERROR_MESSAGE: &str = "Произошла ошибка";

/// Every way a backend interaction can fail
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Superseded by a newer request of the same kind. Never shown to the user.
    #[error("Request cancelled")]
    Cancelled,

    #[error("HTTP error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Http {
        status: u16,
        message: Option<String>,
    },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Response parsing failed: {0}")]
    Decode(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for display: the backend's own message when it sent one
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { message: Some(message), .. } if !message.is_empty() => message.clone(),
            ApiError::Domain(err) => err.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Domain(DomainError::Validation(err))
    }
}

/// Business-rule rejections, raised before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Нельзя забронировать места на прошедший сеанс")]
    PastSession,

    #[error("Не выбрано ни одного места")]
    EmptySelection,

    #[error("Сеанс {0} не загружен")]
    SessionNotLoaded(i64),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
