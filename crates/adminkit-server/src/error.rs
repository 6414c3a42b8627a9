//! Mapping of data-access errors to client-facing responses.

use adminkit_dao::DaoError;
use thiserror::Error;

/// Error as shown to a client: a status code and a fixed message.
///
/// Internal error text never reaches the message; it is logged instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status} {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: &'static str,
}

impl ApiError {
    pub const NOT_FOUND: Self = Self {
        status: 404,
        message: "record not found",
    };
    pub const BAD_REQUEST: Self = Self {
        status: 400,
        message: "invalid record id",
    };
    pub const INTERNAL: Self = Self {
        status: 500,
        message: "internal server error",
    };

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound { .. } => Self::NOT_FOUND,
            DaoError::InvalidId { .. } => Self::BAD_REQUEST,
            other => {
                tracing::error!(error = %other, "request failed");
                Self::INTERNAL
            }
        }
    }
}
