//! Networked cache store on Redis.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, Runtime};
use redis::AsyncCommands;

use crate::error::CacheError;
use crate::store::{CacheStore, DEFAULT_PLACEHOLDER_TTL, Lookup};

/// Value stored for not-found placeholders. Never a valid MessagePack record.
pub const PLACEHOLDER: &[u8] = b"*";

/// Connection settings for [`RedisCacheStore::connect`].
#[derive(Debug, Clone)]
pub struct RedisOptions {
    pub url: String,
    pub pool_size: usize,
    pub timeout: Duration,
    /// Prepended to every key, for sharing one Redis between deployments.
    pub key_prefix: String,
    pub placeholder_ttl: Duration,
}

impl Default for RedisOptions {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".into(),
            pool_size: 10,
            timeout: Duration::from_millis(5000),
            key_prefix: String::new(),
            placeholder_ttl: DEFAULT_PLACEHOLDER_TTL,
        }
    }
}

/// Cache store shared across instances through Redis.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
    key_prefix: String,
    placeholder_ttl: Duration,
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("key_prefix", &self.key_prefix)
            .field("placeholder_ttl", &self.placeholder_ttl)
            .finish_non_exhaustive()
    }
}

/// Redis expiry in whole seconds, at least one.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl RedisCacheStore {
    /// Wraps an existing pool.
    pub fn new(pool: Pool, key_prefix: impl Into<String>, placeholder_ttl: Duration) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
            placeholder_ttl,
        }
    }

    /// Builds a pool and checks that a connection can be made.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Backend` if the pool cannot be created or Redis
    /// does not answer a `PING`.
    pub async fn connect(options: &RedisOptions) -> Result<Self, CacheError> {
        let mut redis_config = deadpool_redis::Config::from_url(&options.url);
        let pool_config = redis_config
            .pool
            .get_or_insert_with(|| deadpool_redis::PoolConfig::new(options.pool_size));
        pool_config.max_size = options.pool_size;
        pool_config.timeouts.wait = Some(options.timeout);
        pool_config.timeouts.create = Some(options.timeout);
        pool_config.timeouts.recycle = Some(options.timeout);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::backend(format!("create pool: {e}")))?;

        let mut conn = pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        Ok(Self::new(
            pool,
            options.key_prefix.clone(),
            options.placeholder_ttl,
        ))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let mut conn = self.pool.get().await?;
        let data: Option<Vec<u8>> = conn.get(self.full_key(key)).await?;
        match data {
            None => Err(CacheError::Miss),
            Some(data) if data == PLACEHOLDER => Err(CacheError::Placeholder),
            Some(data) => Ok(data),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(self.full_key(key), value, ttl_secs(ttl))
            .await?;
        Ok(())
    }

    async fn multi_lookup(&self, keys: &[String]) -> Result<HashMap<String, Lookup>, CacheError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let full_keys: Vec<String> = keys.iter().map(|key| self.full_key(key)).collect();

        let mut conn = self.pool.get().await?;
        // MGET explicitly: a single-key `mget` would be sent as GET.
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(&full_keys)
            .query_async(&mut conn)
            .await?;

        Ok(keys
            .iter()
            .zip(values)
            .filter_map(|(key, value)| {
                let found = match value? {
                    data if data == PLACEHOLDER => Lookup::Placeholder,
                    data => Lookup::Value(data),
                };
                Some((key.clone(), found))
            })
            .collect())
    }

    async fn multi_set(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let secs = ttl_secs(ttl);
        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.set_ex(self.full_key(&key), value, secs).ignore();
        }

        let mut conn = self.pool.get().await?;
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(self.full_key(key)).await?;
        Ok(())
    }

    async fn set_placeholder(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(self.full_key(key), PLACEHOLDER, ttl_secs(self.placeholder_ttl))
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
