//! The byte-level cache store contract.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Default expiry of content entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default expiry of not-found placeholders.
pub const DEFAULT_PLACEHOLDER_TTL: Duration = Duration::from_secs(10 * 60);

/// Live content of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Value(Vec<u8>),
    Placeholder,
}

/// Expiring key-value storage with a not-found marker distinct from a missing key.
///
/// Stores are shared by every entity cache and every concurrent reader, so
/// implementations synchronize internally. No operation is atomic across keys.
#[async_trait]
pub trait CacheStore: fmt::Debug + Send + Sync {
    /// Returns the stored bytes.
    ///
    /// # Errors
    ///
    /// `CacheError::Miss` if the key is absent or expired, `CacheError::Placeholder`
    /// if it holds the not-found marker.
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError>;

    /// Stores a value, replacing any placeholder.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Looks up many keys at once. Missing and expired keys are absent from
    /// the result.
    async fn multi_lookup(&self, keys: &[String]) -> Result<HashMap<String, Lookup>, CacheError>;

    /// Like [`multi_lookup`](Self::multi_lookup) with placeholders left out.
    async fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, CacheError> {
        Ok(self
            .multi_lookup(keys)
            .await?
            .into_iter()
            .filter_map(|(key, found)| match found {
                Lookup::Value(data) => Some((key, data)),
                Lookup::Placeholder => None,
            })
            .collect())
    }

    async fn multi_set(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Removes a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Stores the not-found marker with the store's placeholder expiry.
    async fn set_placeholder(&self, key: &str) -> Result<(), CacheError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}
