//! Look-aside caching for AdminKit records.
//!
//! ## Architecture
//!
//! - **Cache Store**: expiring byte storage with a not-found placeholder,
//!   either in-process ([`MemoryCacheStore`]) or shared via Redis ([`RedisCacheStore`])
//! - **Entity Cache**: typed facade per record type with namespaced keys
//!
//! ```text
//! Repository → EntityCache<R> → dyn CacheStore → DashMap | Redis
//! ```

pub mod entity;
pub mod error;
pub mod kind;
pub mod memory_store;
pub mod redis_store;
pub mod store;

pub use entity::{CachedBatch, EntityCache};
pub use error::CacheError;
pub use kind::CacheKind;
pub use memory_store::{MemoryCacheStats, MemoryCacheStore};
pub use redis_store::{PLACEHOLDER, RedisCacheStore, RedisOptions};
pub use store::{CacheStore, DEFAULT_PLACEHOLDER_TTL, DEFAULT_TTL, Lookup};

/// Shared handle to a cache store.
pub type DynCacheStore = std::sync::Arc<dyn CacheStore>;
