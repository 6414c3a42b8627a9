//! Cache backend selection.

use std::fmt;

/// Which cache store backs the entity caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Memory,
    Redis,
    /// No cache: repositories read straight from the store.
    Disabled,
}

impl CacheKind {
    /// Parses a selector case-insensitively. Empty or unknown selectors disable caching.
    pub fn parse(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "memory" => Self::Memory,
            "redis" => Self::Redis,
            _ => Self::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != Self::Disabled
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::Redis => "redis",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}
