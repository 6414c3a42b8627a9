//! Hook for best-effort cache write failures.

use std::fmt;

use adminkit_cache::CacheError;

/// Which best-effort cache write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// Write-through after a successful store load.
    Fill,
    /// Not-found placeholder after a store miss.
    Placeholder,
    /// Entry removal after an update, delete or create.
    Invalidate,
}

impl WriteStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Placeholder => "placeholder",
            Self::Invalidate => "invalidate",
        }
    }
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives cache write failures that do not fail the surrounding operation.
pub trait LoadObserver: Send + Sync {
    fn on_write_failure(&self, entity: &'static str, id: u64, stage: WriteStage, error: &CacheError);
}

/// Logs failures at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_write_failure(&self, entity: &'static str, id: u64, stage: WriteStage, error: &CacheError) {
        tracing::warn!(entity, id, stage = %stage, error = %error, "cache write failed");
    }
}
