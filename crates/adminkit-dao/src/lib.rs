//! Cache-aside data access for AdminKit records.
//!
//! A [`Repository`] combines a backing [`RecordStore`](adminkit_storage::RecordStore)
//! with an optional [`EntityCache`](adminkit_cache::EntityCache):
//!
//! ```text
//! get_by_id(k) → EntityCache::get(k)
//!                  ├─ record       → return it
//!                  ├─ placeholder  → NotFound
//!                  ├─ miss         → single-flight(k): store.query(k)
//!                  │                    ├─ record    → cache.set, return it
//!                  │                    ├─ not found → cache.set_placeholder, NotFound
//!                  │                    └─ error     → propagate, cache untouched
//!                  └─ cache error  → propagate
//! ```
//!
//! However many callers miss on the same id at once, the store is queried
//! for it at most once and every caller gets that query's outcome.

pub mod error;
pub mod metrics;
pub mod observer;
pub mod repository;
pub mod singleflight;

pub use error::DaoError;
pub use observer::{LoadObserver, TracingObserver, WriteStage};
pub use repository::Repository;
pub use singleflight::{Group, Outcome};
