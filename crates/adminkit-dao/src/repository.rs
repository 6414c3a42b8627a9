//! Cache-aside repository for one record type.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use adminkit_cache::{CacheError, CachedBatch, DEFAULT_TTL, EntityCache};
use adminkit_core::{ListParams, Record};
use adminkit_storage::DynRecordStore;
use futures_util::future::join_all;

use crate::error::DaoError;
use crate::metrics;
use crate::observer::{LoadObserver, TracingObserver, WriteStage};
use crate::singleflight::Group;

/// Per-entity data access object.
///
/// Reads go through the entity cache when one is configured. A miss is
/// resolved by a single store query per id, however many callers ask for that
/// id concurrently; the result is written back to the cache, or a placeholder
/// is written if the store has no such record. Without a cache every read goes
/// straight to the store.
///
/// Writes go to the store first and then remove the cache entry.
pub struct Repository<R: Record> {
    store: DynRecordStore<R>,
    cache: Option<EntityCache<R>>,
    loads: Group<u64, Result<R, DaoError>>,
    ttl: Duration,
    observer: Arc<dyn LoadObserver>,
}

impl<R: Record> std::fmt::Debug for Repository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &R::ENTITY)
            .field("store", &self.store.backend_name())
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<R: Record> Repository<R> {
    /// Creates a repository. `cache` is `None` for cache-bypass mode.
    pub fn new(store: DynRecordStore<R>, cache: Option<EntityCache<R>>) -> Self {
        Self {
            store,
            cache,
            loads: Group::new(),
            ttl: DEFAULT_TTL,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Sets the expiry of cached records.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    fn report(&self, id: u64, stage: WriteStage, error: &CacheError) {
        metrics::record_write_failure(R::ENTITY, stage.as_str());
        self.observer.on_write_failure(R::ENTITY, id, stage, error);
    }

    async fn invalidate(&self, id: u64) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.delete(id).await
        {
            self.report(id, WriteStage::Invalidate, &e);
        }
    }

    /// Inserts a record and writes the identifier back into it.
    ///
    /// The cache is not populated. For caller-supplied identifiers any cached
    /// placeholder for that id is removed.
    pub async fn create(&self, record: &mut R) -> Result<u64, DaoError> {
        let id = self.store.insert(record).await?;
        record.set_id(id);
        if !R::GENERATED_ID {
            self.invalidate(id).await;
        }
        Ok(id)
    }

    /// Deletes a record, then removes its cache entry.
    pub async fn delete_by_id(&self, id: u64) -> Result<(), DaoError> {
        self.store.delete_by_id(id).await?;
        self.invalidate(id).await;
        Ok(())
    }

    /// Applies the record's non-zero fields to the stored row, then removes
    /// the cache entry.
    ///
    /// Zero-valued fields are never written, so this cannot clear a column.
    /// The cache entry is removed even if the store update fails.
    pub async fn update_by_id(&self, record: &R) -> Result<(), DaoError> {
        let id = record.id();
        if id == 0 {
            return Err(DaoError::InvalidId { entity: R::ENTITY });
        }
        let result = self.store.update_partial(record).await;
        self.invalidate(id).await;
        result.map_err(DaoError::from)
    }

    /// Reads a record by id.
    ///
    /// # Errors
    ///
    /// - `DaoError::NotFound` if the store has no such record or a placeholder is cached
    /// - `DaoError::Cache` if the cache lookup fails (the store is not consulted)
    /// - `DaoError::Storage` if the store query fails
    pub async fn get_by_id(&self, id: u64) -> Result<R, DaoError> {
        if id == 0 {
            return Err(DaoError::not_found(R::ENTITY, id));
        }
        let Some(cache) = &self.cache else {
            return self.query_store(id).await;
        };

        match cache.get(id).await {
            Ok(record) => {
                tracing::debug!(entity = R::ENTITY, id, "cache hit");
                metrics::record_cache_hit(R::ENTITY);
                return Ok(record);
            }
            Err(CacheError::Placeholder) => {
                tracing::debug!(entity = R::ENTITY, id, "cache placeholder hit");
                metrics::record_placeholder_hit(R::ENTITY);
                return Err(DaoError::not_found(R::ENTITY, id));
            }
            Err(CacheError::Miss) => {
                tracing::debug!(entity = R::ENTITY, id, "cache miss");
                metrics::record_cache_miss(R::ENTITY);
            }
            Err(e) => return Err(DaoError::Cache(e)),
        }

        self.load_once(cache, id).await
    }

    /// Reads many records. Ids that do not exist are absent from the result.
    ///
    /// The cache is consulted once for the whole batch. Ids holding a
    /// placeholder are left out without touching the store; the remaining
    /// misses go straight to the deduplicated load, concurrently.
    pub async fn get_by_ids(&self, ids: &[u64]) -> Result<HashMap<u64, R>, DaoError> {
        let CachedBatch {
            mut records,
            placeholders,
        } = match &self.cache {
            Some(cache) => cache.multi_lookup(ids).await?,
            None => CachedBatch::default(),
        };
        if self.cache.is_some() {
            metrics::record_cache_hits(R::ENTITY, records.len());
            metrics::record_placeholder_hits(R::ENTITY, placeholders.len());
        }

        let mut missing: Vec<u64> = ids
            .iter()
            .copied()
            .filter(|id| *id != 0 && !records.contains_key(id) && !placeholders.contains(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();

        let loaded = join_all(missing.iter().map(|id| async move {
            match &self.cache {
                Some(cache) => {
                    metrics::record_cache_miss(R::ENTITY);
                    self.load_once(cache, *id).await
                }
                None => self.query_store(*id).await,
            }
        }))
        .await;
        for (id, result) in missing.into_iter().zip(loaded) {
            match result {
                Ok(record) => {
                    records.insert(id, record);
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Lists records matching the filters, with the total match count.
    ///
    /// List queries are never cached.
    pub async fn get_by_columns(&self, params: &ListParams) -> Result<(Vec<R>, u64), DaoError> {
        Ok(self.store.query_by_filter(params).await?)
    }

    async fn query_store(&self, id: u64) -> Result<R, DaoError> {
        self.store.query(id).await.map_err(|e| {
            if e.is_not_found() {
                DaoError::not_found(R::ENTITY, id)
            } else {
                DaoError::Storage(e)
            }
        })
    }

    /// Resolves a cache miss through the single-flight group.
    async fn load_once(&self, cache: &EntityCache<R>, id: u64) -> Result<R, DaoError> {
        let outcome = self.loads.work(id, || self.load(cache, id)).await;
        if outcome.shared {
            metrics::record_shared_load(R::ENTITY);
        }
        outcome.value
    }

    /// The deduplicated part of a read: one store query and its cache write.
    async fn load(&self, cache: &EntityCache<R>, id: u64) -> Result<R, DaoError> {
        metrics::record_store_load(R::ENTITY);
        match self.query_store(id).await {
            Ok(record) => {
                if let Err(e) = cache.set(id, Some(&record), self.ttl).await {
                    self.report(id, WriteStage::Fill, &e);
                }
                Ok(record)
            }
            Err(e) if e.is_not_found() => {
                if let Err(err) = cache.set_placeholder(id).await {
                    self.report(id, WriteStage::Placeholder, &err);
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminkit_cache::MemoryCacheStore;
    use adminkit_core::Files;
    use adminkit_db_memory::InMemoryStore;
    use tokio_test::block_on;

    fn repository(store: Arc<InMemoryStore<Files>>, cache: &MemoryCacheStore) -> Repository<Files> {
        Repository::new(store, Some(EntityCache::new(Arc::new(cache.clone()))))
    }

    #[test]
    fn test_id_zero() {
        let store = Arc::new(InMemoryStore::<Files>::new());
        let repo = repository(Arc::clone(&store), &MemoryCacheStore::default());

        assert!(block_on(repo.get_by_id(0)).unwrap_err().is_not_found());
        assert_eq!(
            block_on(repo.update_by_id(&Files::default())),
            Err(DaoError::InvalidId { entity: "files" })
        );
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let store = Arc::new(InMemoryStore::<Files>::new());
        let cache = MemoryCacheStore::default();
        let repo = repository(Arc::clone(&store), &cache);

        let mut file = Files {
            filename: "a.txt".into(),
            ..Default::default()
        };
        let id = repo.create(&mut file).await.unwrap();
        assert_eq!(file.id, id);
        assert_eq!(cache.stats().entries, 0);

        let first = repo.get_by_id(id).await.unwrap();
        let second = repo.get_by_id(id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn test_get_by_ids_mixes_cache_and_store() {
        let store = Arc::new(InMemoryStore::<Files>::new());
        let repo = repository(Arc::clone(&store), &MemoryCacheStore::default());

        for name in ["a", "b", "c"] {
            let mut file = Files {
                filename: name.into(),
                ..Default::default()
            };
            repo.create(&mut file).await.unwrap();
        }
        repo.get_by_id(1).await.unwrap();

        let found = repo.get_by_ids(&[1, 2, 3, 99, 0, 2]).await.unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[&3].filename, "c");
        // id 1 came from the cache; 2, 3 and 99 were loaded once each
        assert_eq!(store.query_count(), 4);
    }

    #[tokio::test]
    async fn test_get_by_ids_reads_the_cache_once_per_id() {
        let store = Arc::new(InMemoryStore::<Files>::new());
        let cache = MemoryCacheStore::default();
        let repo = repository(Arc::clone(&store), &cache);
        let lookups = || {
            let stats = cache.stats();
            stats.hits + stats.misses
        };

        for name in ["a", "b", "c"] {
            let mut file = Files {
                filename: name.into(),
                ..Default::default()
            };
            repo.create(&mut file).await.unwrap();
        }
        repo.get_by_id(1).await.unwrap();
        assert!(repo.get_by_id(99).await.unwrap_err().is_not_found());
        assert_eq!(store.query_count(), 2);

        let before = lookups();
        let found = repo.get_by_ids(&[1, 2, 3, 99]).await.unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(lookups() - before, 4);
        // 2 and 3 were loaded; the placeholder kept 99 away from the store
        assert_eq!(store.query_count(), 4);

        let again = repo.get_by_ids(&[1, 2, 3, 99]).await.unwrap();
        assert_eq!(again, found);
        assert_eq!(store.query_count(), 4);
        assert_eq!(cache.stats().hits, 6);
    }

    #[tokio::test]
    async fn test_bypass_mode() {
        let store = Arc::new(InMemoryStore::<Files>::new());
        let repo = Repository::new(Arc::clone(&store) as DynRecordStore<Files>, None);
        assert!(!repo.is_cached());

        let mut file = Files {
            filename: "a.txt".into(),
            ..Default::default()
        };
        let id = repo.create(&mut file).await.unwrap();
        repo.get_by_id(id).await.unwrap();
        repo.get_by_id(id).await.unwrap();
        assert!(repo.get_by_id(42).await.unwrap_err().is_not_found());
        assert_eq!(store.query_count(), 3);

        let found = repo.get_by_ids(&[id, 42]).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
