//! Two-tier read-through cache
//!
//! Reads try the primary (shared) tier first, then the in-process tier.
//! Writes always land in the in-process tier and are attempted on the
//! primary. Primary failures are logged and absorbed; callers only ever see
//! a hit or a miss. The cache never computes values itself.

use super::backend::{CacheBackend, CachedValue};
use super::memory::MemoryCacheBackend;
use super::remote::RedisCacheBackend;
use crate::config::CacheConfig;
use crate::error::CoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct TieredCache {
    primary: Option<Arc<dyn CacheBackend>>,
    secondary: Arc<dyn CacheBackend>,
    default_ttl: Duration,
    primary_errors: AtomicU64,
}

impl TieredCache {
    pub fn new(
        primary: Option<Arc<dyn CacheBackend>>,
        secondary: Arc<dyn CacheBackend>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            default_ttl,
            primary_errors: AtomicU64::new(0),
        }
    }

    /// In-process tier only
    pub fn local(max_entries: u64, default_ttl: Duration) -> Self {
        Self::new(
            None,
            Arc::new(MemoryCacheBackend::new(max_entries)),
            default_ttl,
        )
    }

    /// Build both tiers from configuration.
    ///
    /// If the primary cannot be reached the cache runs on the in-process
    /// tier alone.
    pub async fn from_config(config: &CacheConfig) -> Self {
        let secondary: Arc<dyn CacheBackend> = Arc::new(MemoryCacheBackend::new(config.max_entries));

        let primary: Option<Arc<dyn CacheBackend>> = match config.redis_url.as_deref() {
            Some(url) => match RedisCacheBackend::connect(url, config.primary_timeout()).await {
                Ok(backend) => {
                    info!("Primary cache connected");
                    Some(Arc::new(backend))
                }
                Err(e) => {
                    let err = CoreError::CacheUnavailable {
                        tier: "redis".to_string(),
                        message: e.to_string(),
                    };
                    warn!(error = %err, "Using in-process cache only");
                    None
                }
            },
            None => {
                debug!("No primary cache configured");
                None
            }
        };

        Self::new(primary, secondary, config.default_ttl())
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Number of primary-tier failures absorbed so far
    pub fn primary_errors(&self) -> u64 {
        self.primary_errors.load(Ordering::Relaxed)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(primary) = &self.primary {
            match primary.get_with_ttl(key).await {
                Ok(Some(hit)) => {
                    debug!(key, tier = primary.backend_type(), "Cache hit");
                    self.mirror(key, &hit).await;
                    return Some(hit.value);
                }
                Ok(None) => {}
                Err(e) => {
                    self.primary_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(key, tier = primary.backend_type(), error = %e, "Primary cache read failed, falling back");
                }
            }
        }

        match self.secondary.get(key).await {
            Ok(Some(value)) => {
                debug!(key, tier = self.secondary.backend_type(), "Cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key, tier = self.secondary.backend_type(), error = %e, "Secondary cache read failed");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: String) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) {
        if let Some(primary) = &self.primary {
            if let Err(e) = primary.set(key, value.clone(), ttl).await {
                self.primary_errors.fetch_add(1, Ordering::Relaxed);
                warn!(key, tier = primary.backend_type(), error = %e, "Primary cache write failed");
            }
        }

        if let Err(e) = self.secondary.set(key, value, ttl).await {
            warn!(key, tier = self.secondary.backend_type(), error = %e, "Secondary cache write failed");
        }
    }

    /// Read and decode a cached value; undecodable entries count as misses
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw).map_err(CoreError::from) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value).map_err(CoreError::from) {
            Ok(raw) => self.set(key, raw).await,
            Err(e) => warn!(key, error = %e, "Skipping cache write"),
        }
    }

    /// Copy a primary hit locally, expiring no later than the primary entry
    async fn mirror(&self, key: &str, hit: &CachedValue) {
        let ttl = hit
            .remaining
            .map_or(self.default_ttl, |left| left.min(self.default_ttl));
        if ttl.is_zero() {
            return;
        }

        if let Err(e) = self.secondary.set(key, hit.value.clone(), ttl).await {
            debug!(key, error = %e, "Failed to mirror primary hit locally");
        }
    }
}
