//! In-process cache with per-entry expiry and least-recently-used eviction.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::CacheResult;
use crate::store::Cache;

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default time an entry stays live after being written.
pub const DEFAULT_EVICTION_TIME: Duration = Duration::from_secs(60);

/// Source of the current instant, injectable for tests.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        self.start + *offset
    }
}

/// A stored value and the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Bounded in-memory cache.
///
/// Entries are kept in recency order: reads and writes move an entry to the
/// back, and the front entry is evicted once `capacity` is exceeded.
pub struct MemoryCache {
    entries: Mutex<IndexMap<String, CacheEntry>>,
    capacity: usize,
    eviction_time: Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create a cache with the given capacity and entry lifetime.
    pub fn new(capacity: usize, eviction_time: Duration) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity,
            eviction_time,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a custom clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn eviction_time(&self) -> Duration {
        self.eviction_time
    }

    /// Number of stored entries, live or not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_EVICTION_TIME)
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("capacity", &self.capacity)
            .field("eviction_time", &self.eviction_time)
            .field("len", &self.len())
            .finish()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        let now = self.clock.now();
        let mut entries = self.lock();

        // Removing and re-inserting moves the entry to the most-recent end.
        match entries.shift_remove(key) {
            Some(entry) if entry.is_live(now) => {
                let value = entry.value.clone();
                entries.insert(key.to_string(), entry);
                Ok(Some(value))
            }
            Some(_) => {
                tracing::trace!(key, "evicted expired cache entry");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Value) -> CacheResult<()> {
        let entry = CacheEntry {
            value,
            expires_at: self.clock.now() + self.eviction_time,
        };

        let mut entries = self.lock();
        entries.shift_remove(key);
        entries.insert(key.to_string(), entry);

        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                tracing::trace!(key = %evicted, "evicted least recently used cache entry");
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.lock().shift_remove(key);
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache_with_clock(capacity: usize, ttl: Duration) -> (MemoryCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::new(capacity, ttl).with_clock(clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (cache, _) = cache_with_clock(10, Duration::from_secs(60));
        cache.put("a", json!({ "n": 1 })).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), Some(json!({ "n": 1 })));
        assert_eq!(cache.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_and_evicted() {
        let (cache, clock) = cache_with_clock(10, Duration::from_secs(60));
        cache.put("a", json!(1)).await.unwrap();

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get("a").await.unwrap(), Some(json!(1)));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_read_does_not_extend_expiry() {
        let (cache, clock) = cache_with_clock(10, Duration::from_secs(10));
        cache.put("a", json!(1)).await.unwrap();
        clock.advance(Duration::from_secs(8));
        assert!(cache.get("a").await.unwrap().is_some());
        clock.advance(Duration::from_secs(8));
        assert!(cache.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted_first() {
        let (cache, _) = cache_with_clock(2, Duration::from_secs(60));
        cache.put("a", json!(1)).await.unwrap();
        cache.put("b", json!(2)).await.unwrap();

        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.get("a").await.unwrap().is_some());
        cache.put("c", json!(3)).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").await.unwrap().is_some());
        assert!(cache.get("b").await.unwrap().is_none());
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_expiry() {
        let (cache, clock) = cache_with_clock(10, Duration::from_secs(10));
        cache.put("a", json!(1)).await.unwrap();
        clock.advance(Duration::from_secs(8));
        cache.put("a", json!(2)).await.unwrap();
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.get("a").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_purge_and_clear() {
        let (cache, clock) = cache_with_clock(10, Duration::from_secs(5));
        cache.put("a", json!(1)).await.unwrap();
        clock.advance(Duration::from_secs(3));
        cache.put("b", json!(2)).await.unwrap();
        clock.advance(Duration::from_secs(3));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);

        cache.delete("b").await.unwrap();
        assert!(cache.is_empty());

        cache.put("c", json!(3)).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_access_keeps_capacity() {
        let cache = Arc::new(MemoryCache::new(16, Duration::from_secs(60)));

        let tasks = (0..64).map(|i| {
            let cache = cache.clone();
            async move {
                let key = format!("k{}", i % 32);
                cache.put(&key, json!(i)).await.unwrap();
                cache.get(&key).await.unwrap()
            }
        });
        futures::future::join_all(tasks).await;

        assert_eq!(cache.len(), 16);
    }
}
