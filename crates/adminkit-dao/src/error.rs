//! Repository error types.

use adminkit_cache::CacheError;
use adminkit_storage::StorageError;

/// Errors returned by [`Repository`](crate::Repository) operations.
///
/// `Clone` so that a deduplicated load can hand the same outcome to every
/// caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DaoError {
    /// The record does not exist (store miss or cached placeholder).
    #[error("record not found: {entity}/{id}")]
    NotFound { entity: &'static str, id: u64 },

    /// The identifier is 0, which never names a record.
    #[error("{entity}: id cannot be 0")]
    InvalidId { entity: &'static str },

    #[error(transparent)]
    Storage(StorageError),

    /// The cache failed during a lookup. Never produced by best-effort cache writes.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl DaoError {
    #[must_use]
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<StorageError> for DaoError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}
