//! Typed per-entity cache over a shared [`CacheStore`].
//!
//! ## Cache Key Format
//!
//! `{prefix}{id}`, e.g. `files:42`. Prefixes are unique per entity and end
//! with `:` so entities sharing one store never collide.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use adminkit_core::Record;

use crate::error::CacheError;
use crate::store::{CacheStore, Lookup};

/// Result of a batch lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedBatch<R> {
    pub records: HashMap<u64, R>,
    /// Ids holding the not-found placeholder.
    pub placeholders: HashSet<u64>,
}

impl<R> Default for CachedBatch<R> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            placeholders: HashSet::new(),
        }
    }
}

/// Entity cache facade. Records are stored as MessagePack with named fields.
pub struct EntityCache<R: Record> {
    store: Arc<dyn CacheStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for EntityCache<R> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.store))
    }
}

impl<R: Record> std::fmt::Debug for EntityCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("entity", &R::ENTITY)
            .field("store", &self.store.name())
            .finish()
    }
}

impl<R: Record> EntityCache<R> {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Returns `None` when caching is disabled.
    pub fn from_store(store: Option<Arc<dyn CacheStore>>) -> Option<Self> {
        store.map(Self::new)
    }

    #[inline]
    pub fn key(id: u64) -> String {
        format!("{}{id}", R::CACHE_PREFIX)
    }

    fn encode(record: &R) -> Result<Vec<u8>, CacheError> {
        rmp_serde::to_vec_named(record).map_err(|e| CacheError::codec(e.to_string()))
    }

    fn decode(data: &[u8]) -> Result<R, CacheError> {
        rmp_serde::from_slice(data).map_err(|e| CacheError::codec(e.to_string()))
    }

    /// Reads a cached record.
    ///
    /// Id 0 always misses. An undecodable entry is deleted and reported as a miss.
    pub async fn get(&self, id: u64) -> Result<R, CacheError> {
        if id == 0 {
            return Err(CacheError::Miss);
        }
        let key = Self::key(id);
        let data = self.store.get(&key).await?;
        match Self::decode(&data) {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to deserialize cached record");
                if let Err(e) = self.store.delete(&key).await {
                    tracing::warn!(key = %key, error = %e, "Failed to drop undecodable entry");
                }
                Err(CacheError::Miss)
            }
        }
    }

    /// Caches a record. Succeeds without writing if `record` is `None` or `id` is 0.
    pub async fn set(&self, id: u64, record: Option<&R>, ttl: Duration) -> Result<(), CacheError> {
        let Some(record) = record else {
            return Ok(());
        };
        if id == 0 {
            return Ok(());
        }
        self.store.set(&Self::key(id), Self::encode(record)?, ttl).await
    }

    /// Looks up many ids at once. Ids without a cached record are absent.
    pub async fn multi_get(&self, ids: &[u64]) -> Result<HashMap<u64, R>, CacheError> {
        Ok(self.multi_lookup(ids).await?.records)
    }

    /// Looks up many ids at once, reporting placeholders apart from misses.
    ///
    /// Undecodable entries count as misses.
    pub async fn multi_lookup(&self, ids: &[u64]) -> Result<CachedBatch<R>, CacheError> {
        let keyed: Vec<(u64, String)> = ids
            .iter()
            .filter(|id| **id != 0)
            .map(|id| (*id, Self::key(*id)))
            .collect();
        let keys: Vec<String> = keyed.iter().map(|(_, key)| key.clone()).collect();
        let mut found = self.store.multi_lookup(&keys).await?;

        let mut batch = CachedBatch::default();
        for (id, key) in keyed {
            match found.remove(&key) {
                None => {}
                Some(Lookup::Placeholder) => {
                    batch.placeholders.insert(id);
                }
                Some(Lookup::Value(data)) => match Self::decode(&data) {
                    Ok(record) => {
                        batch.records.insert(id, record);
                    }
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Skipping undecodable cached record");
                    }
                },
            }
        }
        Ok(batch)
    }

    /// Caches many records, each under its own identifier. Records with id 0 are skipped.
    pub async fn multi_set(&self, records: &[R], ttl: Duration) -> Result<(), CacheError> {
        let mut entries = Vec::with_capacity(records.len());
        for record in records.iter().filter(|r| r.id() != 0) {
            entries.push((Self::key(record.id()), Self::encode(record)?));
        }
        self.store.multi_set(entries, ttl).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), CacheError> {
        self.store.delete(&Self::key(id)).await
    }

    /// Marks `id` as confirmed absent. No-op for id 0.
    pub async fn set_placeholder(&self, id: u64) -> Result<(), CacheError> {
        if id == 0 {
            return Ok(());
        }
        self.store.set_placeholder(&Self::key(id)).await
    }

    pub fn is_placeholder(err: &CacheError) -> bool {
        err.is_placeholder()
    }

    /// Name of the underlying store.
    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }
}
