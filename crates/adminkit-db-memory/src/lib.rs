//! In-memory storage backend for AdminKit.
//!
//! This crate provides an in-memory implementation of the `RecordStore` trait
//! from `adminkit-storage`, using papaya lock-free HashMap for concurrent reads.
//! It backs single-process deployments and is the store double used by the
//! repository tests.
//!
//! # Example
//!
//! ```ignore
//! use adminkit_core::Files;
//! use adminkit_db_memory::InMemoryStore;
//! use adminkit_storage::RecordStore;
//!
//! let store = InMemoryStore::<Files>::new();
//! let id = store.insert(&Files { filename: "a.txt".into(), ..Default::default() }).await?;
//! let file = store.query(id).await?;
//! ```

pub mod query;
pub mod storage;

pub use adminkit_storage::{RecordStore, StorageError};
pub use storage::{InMemoryStore, StoreOptions};

/// Creates a new shareable in-memory store.
pub fn create_memory_store<R: adminkit_core::Record>() -> adminkit_storage::DynRecordStore<R> {
    std::sync::Arc::new(InMemoryStore::<R>::new())
}
