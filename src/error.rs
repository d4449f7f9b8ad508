use thiserror::Error;

use crate::db::dao::DaoLayerError;

/// Every failure a request can end in. The wrapped string is the detail shown
/// to the client in the `error` field of the envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    AlreadyInUse(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    PasswordMismatch(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn already_in_use(message: impl Into<String>) -> Self {
        Self::AlreadyInUse(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn password_mismatch(message: impl Into<String>) -> Self {
        Self::PasswordMismatch(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::BadRequest(message)
            | Self::AlreadyInUse(message)
            | Self::NotFound(message)
            | Self::PasswordMismatch(message)
            | Self::Internal(message) => message.as_str(),
        }
    }

    /// Short, stable description of the error kind.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation failed",
            Self::BadRequest(_) => "Bad request",
            Self::AlreadyInUse(_) => "Already in use",
            Self::NotFound(_) => "Not found",
            Self::PasswordMismatch(_) => "Unauthorized",
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(_) => AppError::internal(err.to_string()),
        }
    }
}
