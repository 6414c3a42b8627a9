//! Storage error types for the backing store abstraction.

use std::fmt;

use adminkit_core::CoreError;

/// Errors that can occur during storage operations.
///
/// `Clone` so that one failed load can be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("Record not found: {entity}/{id}")]
    NotFound {
        /// The entity of the record that was not found.
        entity: String,
        /// The identifier that was not found.
        id: u64,
    },

    /// Attempted to insert a record whose identifier already exists.
    #[error("Record already exists: {entity}/{id}")]
    AlreadyExists {
        /// The entity of the record that already exists.
        entity: String,
        /// The identifier that already exists.
        id: u64,
    },

    /// The record data is invalid.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Description of why the record is invalid.
        message: String,
    },

    /// The list query could not be translated.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Description of the rejected query.
        message: String,
    },

    /// Failed to connect to the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: u64) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(entity: impl Into<String>, id: u64) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            id,
        }
    }

    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidQuery` error.
    #[must_use]
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::InvalidRecord { .. } | Self::InvalidQuery { .. } => ErrorCategory::Validation,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<CoreError> for StorageError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownColumn { .. } | CoreError::InvalidQuery(_) => {
                StorageError::invalid_query(err.to_string())
            }
            CoreError::InvalidRecord { message } => StorageError::invalid_record(message),
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Record not found.
    NotFound,
    /// Identifier conflict.
    Conflict,
    /// Validation error.
    Validation,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::not_found("files", 123);
        assert_eq!(err.to_string(), "Record not found: files/123");

        let err = StorageError::already_exists("userRoles", 456);
        assert_eq!(err.to_string(), "Record already exists: userRoles/456");
    }

    #[test]
    fn test_error_predicates() {
        let err = StorageError::not_found("files", 1);
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());

        let err = StorageError::connection_error("refused");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::not_found("files", 1).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            StorageError::already_exists("roles", 1).category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            StorageError::invalid_query("bad column").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StorageError::connection_error("down").category(),
            ErrorCategory::Infrastructure
        );
    }

    #[test]
    fn test_from_core_error() {
        let err: StorageError = CoreError::unknown_column("files", "nope").into();
        assert!(matches!(err, StorageError::InvalidQuery { .. }));
    }
}
