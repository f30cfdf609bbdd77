//! Shared primary cache tier backed by Redis
//!
//! Every network call is wrapped in a timeout so a slow or unreachable
//! server costs at most `timeout` before the caller falls back.

use super::backend::{CacheBackend, CacheError, CachedValue, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub struct RedisCacheBackend {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisCacheBackend {
    /// Open a managed connection; the initial connect is also time-bounded
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;

        let conn = bounded(timeout, client.get_connection_manager()).await?;
        debug!(url, "Connected to primary cache");

        Ok(Self { conn, timeout })
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        bounded(self.timeout, conn.get::<_, Option<String>>(key)).await
    }

    async fn get_with_ttl(&self, key: &str) -> Result<Option<CachedValue>> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic().get(key).pttl(key);

        let (value, pttl): (Option<String>, i64) =
            bounded(self.timeout, pipe.query_async(&mut conn)).await?;
        Ok(value.map(|value| CachedValue {
            value,
            remaining: remaining_from_pttl(pttl),
        }))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let seconds = ttl.as_secs().max(1);
        bounded(self.timeout, conn.set_ex::<_, _, ()>(key, value, seconds)).await
    }

    fn backend_type(&self) -> &str {
        "redis"
    }
}

/// PTTL reply: milliseconds left, `-1` for no expiry, `-2` for a missing key
fn remaining_from_pttl(pttl: i64) -> Option<Duration> {
    u64::try_from(pttl).ok().map(Duration::from_millis)
}

async fn bounded<T>(
    timeout: Duration,
    fut: impl Future<Output = redis::RedisResult<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) if e.is_connection_refusal() || e.is_io_error() || e.is_connection_dropped() => {
            Err(CacheError::Connection(e.to_string()))
        }
        Ok(Err(e)) => Err(CacheError::Backend(e.to_string())),
        Err(_) => Err(CacheError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_from_pttl() {
        assert_eq!(remaining_from_pttl(1500), Some(Duration::from_millis(1500)));
        assert_eq!(remaining_from_pttl(0), Some(Duration::ZERO));
        assert_eq!(remaining_from_pttl(-1), None);
        assert_eq!(remaining_from_pttl(-2), None);
    }

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let result = RedisCacheBackend::connect("not a url", Duration::from_millis(50)).await;
        assert!(matches!(result, Err(CacheError::Connection(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_within_timeout() {
        let started = std::time::Instant::now();
        // Port 1 on loopback is reserved and refuses connections.
        let result =
            RedisCacheBackend::connect("redis://127.0.0.1:1/", Duration::from_millis(200)).await;
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
