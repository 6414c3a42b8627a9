//! Logging setup.
//!
//! The subscriber is installed before the configuration is read, at `info`,
//! and switched to `logging.level` once it is known. `RUST_LOG` wins over both.

use std::sync::OnceLock;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

static FILTER: OnceLock<FilterHandle> = OnceLock::new();

/// Level used until the configuration has been loaded.
pub const STARTUP_LEVEL: &str = "info";

/// Directives for `level`. sqlx logs every statement at `info`, so it is held
/// at `warn` unless a quieter level was asked for.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "warn" | "error" | "off" => level,
        _ => format!("{level},sqlx=warn"),
    }
}

fn filter_for(level: &str) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_new(filter_directives(level))
}

fn rust_log_is_set() -> bool {
    std::env::var_os("RUST_LOG").is_some()
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_tracing() {
    let filter = if rust_log_is_set() {
        EnvFilter::try_from_default_env().ok()
    } else {
        None
    };
    let filter = match filter {
        Some(filter) => filter,
        None => filter_for(STARTUP_LEVEL).unwrap_or_else(|_| EnvFilter::new(STARTUP_LEVEL)),
    };

    let (layer, handle) = reload::Layer::new(filter);
    if FILTER.set(handle).is_err() {
        return;
    }
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Switches the log level. Returns whether the filter changed.
///
/// Nothing changes when `RUST_LOG` is set, before [`init_tracing`], or for a
/// level that does not parse.
pub fn apply_logging_level(level: &str) -> bool {
    if rust_log_is_set() {
        tracing::debug!(level, "RUST_LOG is set; ignoring logging.level");
        return false;
    }
    let Some(handle) = FILTER.get() else {
        return false;
    };
    let filter = match filter_for(level) {
        Ok(filter) => filter,
        Err(e) => {
            tracing::warn!(level, error = %e, "Invalid logging.level; keeping current filter");
            return false;
        }
    };
    handle.reload(filter).is_ok()
}
