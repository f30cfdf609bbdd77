//! Contract shared by every cache tier

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors a cache backend may report; the tiered cache never surfaces them
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// A hit together with how long the backend will keep serving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
    pub value: String,
    /// `None` when the backend cannot tell
    pub remaining: Option<Duration>,
}

/// A key/value store holding serialized results with a per-entry TTL
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Like [`get`](Self::get), also reporting the entry's remaining lifetime
    async fn get_with_ttl(&self, key: &str) -> Result<Option<CachedValue>> {
        Ok(self.get(key).await?.map(|value| CachedValue {
            value,
            remaining: None,
        }))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Short identifier used in logs
    fn backend_type(&self) -> &str;
}
