use thiserror::Error;

/// Core error types for AdminKit record handling
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown column '{column}' for {entity}")]
    UnknownColumn { entity: String, column: String },

    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),

    #[error("Invalid record data: {message}")]
    InvalidRecord { message: String },
}

impl CoreError {
    /// Create a new UnknownColumn error
    pub fn unknown_column(entity: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            entity: entity.into(),
            column: column.into(),
        }
    }

    /// Create a new InvalidQuery error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Create a new InvalidRecord error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::unknown_column("files", "secret");
        assert_eq!(err.to_string(), "Unknown column 'secret' for files");

        let err = CoreError::invalid_query("limit must be > 0");
        assert_eq!(
            err.to_string(),
            "Invalid query parameters: limit must be > 0"
        );
    }
}
