//! The backing store trait.

use async_trait::async_trait;

use adminkit_core::{ListParams, Record};

use crate::error::StorageError;

/// Persistence contract for one record type.
///
/// Implementations must be thread-safe (`Send + Sync`); the repository layer
/// shares one store between all concurrent readers and writers and performs
/// no client-side locking around it.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Reads a record by identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no row matches.
    async fn query(&self, id: u64) -> Result<R, StorageError>;

    /// Inserts a record and returns its identifier.
    ///
    /// For records with store-generated identifiers the supplied id is ignored
    /// and the generated one is returned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a caller-supplied identifier is taken.
    async fn insert(&self, record: &R) -> Result<u64, StorageError>;

    /// Deletes a record by identifier. Deleting a missing row succeeds.
    async fn delete_by_id(&self, id: u64) -> Result<(), StorageError>;

    /// Applies the record's sparse patch ([`Record::patch`]) to the stored row.
    ///
    /// Columns with zero values are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` if the identifier is 0.
    async fn update_partial(&self, record: &R) -> Result<(), StorageError>;

    /// Returns one page of records matching the filters and the total match count.
    ///
    /// The count is 0 when the parameters ask to skip counting.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidQuery` for columns outside the record whitelist.
    async fn query_by_filter(&self, params: &ListParams) -> Result<(Vec<R>, u64), StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
