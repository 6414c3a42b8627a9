//! Process-level wiring for AdminKit: configuration, logging and the seven
//! entity repositories.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod observability;

pub use bootstrap::{AppState, Backend, CacheSetup, create_cache_store};
pub use config::{
    AppConfig, CacheConfig, LoggingConfig, PostgresStorageConfig, RedisConfig, StorageConfig,
};
pub use error::ApiError;
pub use observability::{apply_logging_level, init_tracing};
