//! Cache error types.

/// Errors returned by cache stores and entity caches.
///
/// `Miss` and `Placeholder` are lookup outcomes rather than failures; the
/// loader turns them into a store query and a not-found answer respectively.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The key is not in the cache.
    #[error("cache miss")]
    Miss,

    /// The key holds the not-found placeholder.
    #[error("cache placeholder")]
    Placeholder,

    /// The cache service failed (connection, command or pool error).
    #[error("cache backend error: {message}")]
    Backend { message: String },

    /// A value could not be encoded or decoded.
    #[error("cache codec error: {message}")]
    Codec { message: String },
}

impl CacheError {
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::backend(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::backend(format!("pool: {err}"))
    }
}
