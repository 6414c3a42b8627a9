//! Wiring of stores, caches and repositories from [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use adminkit_cache::{CacheKind, DynCacheStore, EntityCache, MemoryCacheStore, RedisCacheStore};
use adminkit_core::{Files, Menus, Permissions, Record, RolePermissions, Roles, UserRoles, Users};
use adminkit_dao::Repository;
use adminkit_db_memory::create_memory_store;
use adminkit_db_postgres::{PgPool, PostgresStore};
use adminkit_storage::DynRecordStore;
use tokio::task::JoinHandle;

use crate::config::{AppConfig, CacheConfig, RedisConfig};

/// Backing store shared by all repositories.
#[derive(Debug, Clone)]
pub enum Backend {
    Memory,
    Postgres(PgPool),
}

impl Backend {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        if !config.uses_postgres() {
            tracing::info!("Using in-memory storage");
            return Ok(Self::Memory);
        }
        let pg = config.storage.postgres.to_postgres_config();
        let pool = adminkit_db_postgres::connect(&pg).await?;
        Ok(Self::Postgres(pool))
    }

    /// A store for `R`. Each call to a memory backend returns a fresh, empty store.
    pub fn store<R: Record>(&self) -> DynRecordStore<R> {
        match self {
            Self::Memory => create_memory_store::<R>(),
            Self::Postgres(pool) => Arc::new(PostgresStore::<R>::from_pool(pool.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

/// Cache store selected by configuration.
pub struct CacheSetup {
    pub store: Option<DynCacheStore>,
    /// Effective kind after any fallback.
    pub kind: CacheKind,
    pub janitor: Option<JoinHandle<()>>,
}

fn memory_cache(cache: &CacheConfig) -> CacheSetup {
    let store = MemoryCacheStore::new(cache.placeholder_ttl());
    let janitor = cache
        .cleanup_interval()
        .map(|interval| store.spawn_janitor(interval));
    CacheSetup {
        store: Some(Arc::new(store)),
        kind: CacheKind::Memory,
        janitor,
    }
}

/// Creates the cache store.
///
/// An unreachable Redis falls back to the in-memory store so the process can
/// still start.
pub async fn create_cache_store(cache: &CacheConfig, redis: &RedisConfig) -> CacheSetup {
    match cache.kind() {
        CacheKind::Disabled => {
            tracing::info!(cache_type = %cache.cache_type, "Entity cache disabled");
            CacheSetup {
                store: None,
                kind: CacheKind::Disabled,
                janitor: None,
            }
        }
        CacheKind::Memory => {
            tracing::info!("Using in-memory entity cache");
            memory_cache(cache)
        }
        CacheKind::Redis => {
            tracing::info!(url = %redis.url, "Connecting to Redis");
            match RedisCacheStore::connect(&redis.to_options(cache.placeholder_ttl())).await {
                Ok(store) => {
                    tracing::info!("Connected to Redis");
                    CacheSetup {
                        store: Some(Arc::new(store)),
                        kind: CacheKind::Redis,
                        janitor: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to connect to Redis. Falling back to in-memory cache."
                    );
                    memory_cache(cache)
                }
            }
        }
    }
}

fn repository<R: Record>(
    backend: &Backend,
    cache: Option<&DynCacheStore>,
    ttl: Duration,
) -> Arc<Repository<R>> {
    let cache = EntityCache::from_store(cache.cloned());
    Arc::new(Repository::new(backend.store::<R>(), cache).with_ttl(ttl))
}

/// The seven entity repositories and the resources they share.
pub struct AppState {
    pub files: Arc<Repository<Files>>,
    pub menus: Arc<Repository<Menus>>,
    pub permissions: Arc<Repository<Permissions>>,
    pub roles: Arc<Repository<Roles>>,
    pub role_permissions: Arc<Repository<RolePermissions>>,
    pub user_roles: Arc<Repository<UserRoles>>,
    pub users: Arc<Repository<Users>>,
    pub backend: Backend,
    pub cache_kind: CacheKind,
    janitor: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.backend.name())
            .field("cache_kind", &self.cache_kind)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Connects the backing store and the cache and builds every repository.
    ///
    /// # Errors
    ///
    /// Fails if the PostgreSQL pool or schema cannot be set up. Cache
    /// problems never fail startup.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let backend = Backend::connect(config).await?;
        let setup = create_cache_store(&config.cache, &config.redis).await;
        Ok(Self::assemble(backend, setup, config.cache.ttl()))
    }

    pub fn assemble(backend: Backend, setup: CacheSetup, ttl: Duration) -> Self {
        let cache = setup.store.as_ref();
        let state = Self {
            files: repository(&backend, cache, ttl),
            menus: repository(&backend, cache, ttl),
            permissions: repository(&backend, cache, ttl),
            roles: repository(&backend, cache, ttl),
            role_permissions: repository(&backend, cache, ttl),
            user_roles: repository(&backend, cache, ttl),
            users: repository(&backend, cache, ttl),
            cache_kind: setup.kind,
            janitor: setup.janitor,
            backend,
        };
        tracing::info!(
            backend = state.backend.name(),
            cache = %state.cache_kind,
            ttl_secs = ttl.as_secs(),
            "Repositories ready"
        );
        state
    }

    /// Stops background tasks and closes the connection pool.
    pub async fn shutdown(mut self) {
        if let Some(janitor) = self.janitor.take() {
            janitor.abort();
        }
        if let Backend::Postgres(pool) = &self.backend {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminkit_cache::CacheStore;

    #[tokio::test]
    async fn test_disabled_cache_has_no_store() {
        let cache = CacheConfig {
            cache_type: "none".into(),
            ..Default::default()
        };
        let setup = create_cache_store(&cache, &RedisConfig::default()).await;
        assert!(setup.store.is_none());
        assert_eq!(setup.kind, CacheKind::Disabled);
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory() {
        let cache = CacheConfig {
            cache_type: "Redis".into(),
            ..Default::default()
        };
        let redis = RedisConfig {
            url: "redis://127.0.0.1:1".into(),
            timeout_ms: 200,
            ..Default::default()
        };
        let setup = create_cache_store(&cache, &redis).await;
        assert_eq!(setup.kind, CacheKind::Memory);
        assert_eq!(setup.store.map(|s| s.name()), Some("memory"));
        assert!(setup.janitor.is_some());
    }

    #[tokio::test]
    async fn test_memory_backends_are_per_entity() {
        let state = AppState::assemble(
            Backend::Memory,
            memory_cache(&CacheConfig::default()),
            Duration::from_secs(60),
        );
        let mut file = Files {
            filename: "a.txt".into(),
            ..Default::default()
        };
        let mut menu = Menus {
            name: "home".into(),
            ..Default::default()
        };
        assert_eq!(state.files.create(&mut file).await.unwrap(), 1);
        assert_eq!(state.menus.create(&mut menu).await.unwrap(), 1);
        assert!(state.files.is_cached());
        state.shutdown().await;
    }
}
