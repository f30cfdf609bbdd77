//! In-process cache tier backed by Moka
//!
//! Bounded by entry count. Each entry carries its own TTL and is dropped
//! when a read finds it expired.

use super::backend::{CacheBackend, CachedValue, Result};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stored value plus its insertion time and lifetime
#[derive(Debug)]
pub struct CacheEntry {
    pub value: String,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }

    pub fn remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.inserted_at.elapsed())
    }
}

pub struct MemoryCacheBackend {
    cache: Cache<String, Arc<CacheEntry>>,
}

impl MemoryCacheBackend {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flush Moka's pending maintenance (eviction bookkeeping)
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_with_ttl(key).await?.map(|hit| hit.value))
    }

    async fn get_with_ttl(&self, key: &str) -> Result<Option<CachedValue>> {
        match self.cache.get(key).await {
            Some(entry) if entry.is_expired() => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(CachedValue {
                value: entry.value.clone(),
                remaining: Some(entry.remaining()),
            })),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let entry = Arc::new(CacheEntry {
            value,
            inserted_at: Instant::now(),
            ttl,
        });
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    fn backend_type(&self) -> &str {
        "memory"
    }
}
