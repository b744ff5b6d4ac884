//! The cache port consumed by the execution pipeline.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CacheResult;

/// Key-value store holding raw fetch results.
///
/// Implementations decide expiry and eviction; the pipeline only calls
/// `get` before a fetch and `put` after a successful one. Every method must
/// be atomic on its own; no ordering is promised between concurrent calls.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up a live entry. Expired entries are reported as absent.
    async fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Store a value; the backend stamps its expiry.
    async fn put(&self, key: &str, value: Value) -> CacheResult<()>;

    /// Delete a single entry.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Drop every entry.
    async fn clear(&self) -> CacheResult<()>;
}

/// Cache that never stores anything.
///
/// Injected by default so the pipeline runs identically with or without a
/// configured cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Value>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: Value) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        Ok(())
    }
}
