//! Per-procedure cache policies and client-level cache configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::key::CacheKeyBuilder;
use crate::memory::{MemoryCache, DEFAULT_CAPACITY};
use crate::store::{Cache, NoopCache};

/// Outcome of the cache step for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from a live cache entry.
    Hit,
    /// Fetched and written to the cache.
    Miss,
    /// Procedure is not cacheable.
    Bypass,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Bypass => write!(f, "BYPASS"),
        }
    }
}

/// Request context field a cache key varies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum VaryRule {
    /// Vary by locale.
    Locale,
    /// Vary by currency code.
    Currency,
    /// Vary by store key.
    Store,
    /// Vary by tax country.
    Country,
    /// Vary by tax state.
    State,
    /// Vary by identity (personalized results).
    Identity,
    /// Static discriminator, e.g. a schema version.
    Custom(String),
}

/// Whether a procedure's fetch results may be cached, and on what.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Context fields folded into the key alongside the input.
    pub vary: Vec<VaryRule>,
}

impl CachePolicy {
    /// Never cache.
    pub fn none() -> Self {
        Self::default()
    }

    /// Cache keyed on procedure and input only.
    pub fn cached() -> Self {
        Self {
            enabled: true,
            vary: Vec::new(),
        }
    }

    /// Add a vary rule.
    pub fn vary_on(mut self, rule: VaryRule) -> Self {
        self.vary.push(rule);
        self
    }

    /// Add multiple vary rules.
    pub fn vary_on_all(mut self, rules: Vec<VaryRule>) -> Self {
        self.vary.extend(rules);
        self
    }

    /// Key builder for this policy.
    pub fn key_builder(&self) -> CacheKeyBuilder {
        CacheKeyBuilder::from_vary_rules(&self.vary)
    }
}

/// Client-level cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Use an in-memory cache; otherwise the no-op cache.
    #[serde(default)]
    pub enabled: bool,
    /// Maximum number of entries.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Seconds an entry stays live after being written.
    #[serde(default = "default_eviction_secs")]
    pub eviction_secs: u64,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_eviction_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: default_capacity(),
            eviction_secs: default_eviction_secs(),
        }
    }
}

impl CacheConfig {
    /// An enabled in-memory cache configuration.
    pub fn memory(capacity: usize, eviction_time: Duration) -> Self {
        Self {
            enabled: true,
            capacity,
            eviction_secs: eviction_time.as_secs(),
        }
    }

    pub fn eviction_time(&self) -> Duration {
        Duration::from_secs(self.eviction_secs)
    }

    /// Instantiate the configured cache.
    pub fn build(&self) -> Arc<dyn Cache> {
        if self.enabled {
            Arc::new(MemoryCache::new(self.capacity, self.eviction_time()))
        } else {
            Arc::new(NoopCache)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_builders() {
        assert!(!CachePolicy::none().enabled);

        let policy = CachePolicy::cached()
            .vary_on(VaryRule::Locale)
            .vary_on_all(vec![VaryRule::Currency, VaryRule::Store]);
        assert!(policy.enabled);
        assert_eq!(policy.vary.len(), 3);
    }

    #[test]
    fn test_cache_config_defaults() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CacheConfig::default());
        assert!(!config.enabled);
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.eviction_time(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_build_respects_enabled_flag() {
        let disabled = CacheConfig::default().build();
        disabled.put("k", serde_json::json!(1)).await.unwrap();
        assert!(disabled.get("k").await.unwrap().is_none());

        let enabled = CacheConfig::memory(10, Duration::from_secs(30)).build();
        enabled.put("k", serde_json::json!(1)).await.unwrap();
        assert!(enabled.get("k").await.unwrap().is_some());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CacheStatus::Hit.to_string(), "HIT");
        assert_eq!(serde_json::to_string(&CacheStatus::Bypass).unwrap(), r#""bypass""#);
    }
}
