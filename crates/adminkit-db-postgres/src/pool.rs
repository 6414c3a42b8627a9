//! The connection pool shared by every entity store.

use sqlx_core::pool::PoolOptions;
use sqlx_postgres::{PgPool, Postgres};
use tracing::{debug, info, instrument};

use crate::config::PostgresConfig;
use crate::error::Result;

pub type PgPoolOptions = PoolOptions<Postgres>;

/// Validates `config` and opens the pool.
#[instrument(skip(config), fields(url = %redact_url(&config.url)))]
pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    config.validate()?;

    info!(
        pool_size = config.pool_size,
        min_connections = config.min_connections(),
        connect_timeout_ms = config.connect_timeout.as_millis() as u64,
        "Creating PostgreSQL connection pool"
    );

    let pool = config.pool_options().connect(&config.url).await?;
    debug!("PostgreSQL connection pool created");
    Ok(pool)
}

/// `url` with the password replaced by `****`, for logs.
///
/// Unencoded `@` in the password is tolerated: the last `@` ends the user info.
pub fn redact_url(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, url),
    };
    let Some((user_info, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    let Some((user, _password)) = user_info.split_once(':') else {
        return url.to_string();
    };
    match scheme {
        Some(scheme) => format!("{scheme}://{user}:****@{host}"),
        None => format!("{user}:****@{host}"),
    }
}
