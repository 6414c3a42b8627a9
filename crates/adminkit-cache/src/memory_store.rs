//! In-process cache store on a DashMap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::error::CacheError;
use crate::store::{CacheStore, DEFAULT_PLACEHOLDER_TTL, Lookup};

#[derive(Debug, Clone)]
enum Slot {
    Value(Arc<Vec<u8>>),
    Placeholder,
}

/// A cached slot with its expiry.
#[derive(Debug, Clone)]
struct MemoryEntry {
    slot: Slot,
    expires_at: Instant,
}

impl MemoryEntry {
    fn new(slot: Slot, ttl: Duration) -> Self {
        Self {
            slot,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug)]
struct Inner {
    entries: DashMap<String, MemoryEntry>,
    placeholder_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Inner {
    fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }
}

/// Memory cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Single-process cache store.
///
/// Expired entries are dropped lazily on read and in bulk by
/// [`cleanup_expired`](Self::cleanup_expired) or the janitor task.
#[derive(Debug, Clone)]
pub struct MemoryCacheStore {
    inner: Arc<Inner>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_TTL)
    }
}

impl MemoryCacheStore {
    pub fn new(placeholder_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                placeholder_ttl,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
        }
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.inner.cleanup_expired()
    }

    /// Starts a task that sweeps expired entries every `interval`.
    ///
    /// The task stops on its own once the last handle to the store is dropped.
    pub fn spawn_janitor(&self, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let removed = inner.cleanup_expired();
                if removed > 0 {
                    tracing::debug!(removed, "memory cache sweep");
                }
            }
        })
    }

    pub fn stats(&self) -> MemoryCacheStats {
        MemoryCacheStats {
            entries: self.inner.entries.len(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
        }
    }

    /// Reads a live slot, dropping it if expired.
    fn lookup(&self, key: &str) -> Option<Slot> {
        let entries = &self.inner.entries;
        let slot = match entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.slot.clone()),
            Some(entry) => {
                drop(entry);
                if entries.remove_if(key, |_, e| e.is_expired()).is_some() {
                    self.inner.evictions.fetch_add(1, Ordering::Relaxed);
                }
                None
            }
            None => None,
        };

        let counter = if slot.is_some() {
            &self.inner.hits
        } else {
            &self.inner.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        slot
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        match self.lookup(key) {
            Some(Slot::Value(data)) => Ok(data.as_ref().clone()),
            Some(Slot::Placeholder) => Err(CacheError::Placeholder),
            None => Err(CacheError::Miss),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.inner.entries.insert(
            key.to_string(),
            MemoryEntry::new(Slot::Value(Arc::new(value)), ttl),
        );
        Ok(())
    }

    async fn multi_lookup(&self, keys: &[String]) -> Result<HashMap<String, Lookup>, CacheError> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            let slot = match self.lookup(key) {
                Some(Slot::Value(data)) => Lookup::Value(data.as_ref().clone()),
                Some(Slot::Placeholder) => Lookup::Placeholder,
                None => continue,
            };
            found.insert(key.clone(), slot);
        }
        Ok(found)
    }

    async fn multi_set(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        for (key, value) in entries {
            self.inner
                .entries
                .insert(key, MemoryEntry::new(Slot::Value(Arc::new(value)), ttl));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.entries.remove(key);
        Ok(())
    }

    async fn set_placeholder(&self, key: &str) -> Result<(), CacheError> {
        self.inner.entries.insert(
            key.to_string(),
            MemoryEntry::new(Slot::Placeholder, self.inner.placeholder_ttl),
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_delete() {
        let store = MemoryCacheStore::default();
        assert_eq!(store.get("files:1").await, Err(CacheError::Miss));

        store
            .set("files:1", b"record".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("files:1").await.unwrap(), b"record".to_vec());

        store.delete("files:1").await.unwrap();
        store.delete("files:1").await.unwrap();
        assert_eq!(store.get("files:1").await, Err(CacheError::Miss));

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 0);
    }

    #[tokio::test]
    async fn test_placeholder_is_distinct_and_overwritten_by_set() {
        let store = MemoryCacheStore::default();
        store.set_placeholder("roles:9").await.unwrap();
        assert_eq!(store.get("roles:9").await, Err(CacheError::Placeholder));

        store
            .set("roles:9", b"role".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("roles:9").await.unwrap(), b"role".to_vec());
    }

    #[tokio::test]
    async fn test_expiration() {
        let store = MemoryCacheStore::new(Duration::from_millis(50));
        store
            .set("menus:1", b"menu".to_vec(), Duration::from_millis(50))
            .await
            .unwrap();
        store.set_placeholder("menus:2").await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(store.get("menus:1").await, Err(CacheError::Miss));
        assert_eq!(store.get("menus:2").await, Err(CacheError::Miss));
        assert_eq!(store.stats().evictions, 2);
    }

    #[tokio::test]
    async fn test_multi_get_skips_missing_and_placeholders() {
        let store = MemoryCacheStore::default();
        store
            .multi_set(
                vec![
                    ("users:1".to_string(), b"one".to_vec()),
                    ("users:2".to_string(), b"two".to_vec()),
                ],
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        store.set_placeholder("users:3").await.unwrap();

        let keys: Vec<String> = (1..=4).map(|i| format!("users:{i}")).collect();
        let found = store.multi_get(&keys).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found["users:1"], b"one".to_vec());
        assert_eq!(found["users:2"], b"two".to_vec());

        let looked_up = store.multi_lookup(&keys).await.unwrap();
        assert_eq!(looked_up.len(), 3);
        assert_eq!(looked_up["users:3"], Lookup::Placeholder);
        assert!(!looked_up.contains_key("users:4"));
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let store = MemoryCacheStore::default();
        store
            .set("a", b"1".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();
        store
            .set("b", b"2".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.stats().entries, 1);
    }

    #[tokio::test]
    async fn test_janitor_sweeps() {
        let store = MemoryCacheStore::default();
        store
            .set("a", b"1".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();
        let janitor = store.spawn_janitor(Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.stats().entries, 0);

        drop(store);
        tokio::time::timeout(Duration::from_secs(1), janitor)
            .await
            .expect("janitor stops after the store is dropped")
            .unwrap();
    }
}
