//! Cache store contract, Redis implementation and fail-open decorator.

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::warn;

use crate::error::AppError;

/// Error from the cache backend. Callers above the fail-open decorator
/// never see this type.
#[derive(Debug, thiserror::Error)]
#[error("cache error: {0}")]
pub struct CacheError(pub String);

/// Key/value store with per-key TTL. Values are JSON-serialized strings;
/// key namespaces and TTL choices live in [`crate::cache::keys`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

/// Redis-backed cache store over a shared `ConnectionManager`.
///
/// The manager is created once at process start (see `infra::state`) and
/// cloned per call; cloning is cheap and reuses the underlying connection.
#[derive(Clone)]
pub struct RedisCacheStore {
    manager: ConnectionManager,
}

impl RedisCacheStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        let manager = ConnectionManager::new(client).await.map_err(|err| {
            AppError::internal(format!("Unable to initialize Redis connection manager: {err}"))
        })?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        conn.get(key)
            .await
            .map_err(|err| CacheError(format!("GET {key}: {err}")))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(|err| CacheError(format!("SETEX {key}: {err}")))?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .del(key)
            .await
            .map_err(|err| CacheError(format!("DEL {key}: {err}")))?;
        Ok(())
    }
}

/// Decorator that converts every cache failure into a miss (reads) or a
/// no-op (writes and deletes), logging a warning.
///
/// This is the single place where the fail-open policy lives: the cache is
/// a disposable projection, so an unreachable cache degrades latency, never
/// correctness or availability. TTL expiry remains the fallback consistency
/// guarantee when an invalidation is dropped here.
pub struct FailOpenCache {
    inner: Arc<dyn CacheStore>,
}

impl FailOpenCache {
    pub fn new(inner: Arc<dyn CacheStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CacheStore for FailOpenCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.inner.get(key).await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(key, "cache read failed, treating as miss: {err}");
                Ok(None)
            }
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        if let Err(err) = self.inner.set_with_ttl(key, value, ttl_secs).await {
            warn!(key, "cache write failed, skipping populate: {err}");
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        if let Err(err) = self.inner.del(key).await {
            warn!(key, "cache invalidation failed, relying on TTL expiry: {err}");
        }
        Ok(())
    }
}
