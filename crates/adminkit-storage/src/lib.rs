//! # adminkit-storage
//!
//! Backing store abstraction for AdminKit.
//!
//! This crate defines the contract every persistence backend implements for a
//! record type. It contains no implementations; see `adminkit-db-memory` and
//! `adminkit-db-postgres`.
//!
//! ## Example
//!
//! ```ignore
//! use adminkit_core::Files;
//! use adminkit_storage::{RecordStore, StorageError};
//!
//! async fn file_name(store: &dyn RecordStore<Files>, id: u64) -> Result<String, StorageError> {
//!     let file = store.query(id).await?;
//!     Ok(file.filename)
//! }
//! ```
//!
//! A missing row is always reported as [`StorageError::NotFound`], never as an
//! empty record, so callers can tell "absent" apart from infrastructure failures.

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::RecordStore;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shareable record store.
pub type DynRecordStore<R> = std::sync::Arc<dyn RecordStore<R>>;
