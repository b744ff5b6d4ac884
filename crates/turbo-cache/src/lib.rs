//! Cache port for TurboCommerce procedure results.
//!
//! This crate provides:
//! - `Cache` - The key-value port the execution pipeline reads and writes
//! - `NoopCache` - Default cache that stores nothing
//! - `MemoryCache` - Bounded cache with per-entry expiry and LRU eviction
//! - `CachePolicy` / `VaryRule` - Per-procedure caching rules
//! - `CacheKeyBuilder` - Deterministic keys from procedure, input and context
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use turbo_cache::{CacheConfig, CachePolicy, VaryRule};
//!
//! let cache = CacheConfig::memory(500, Duration::from_secs(300)).build();
//!
//! let policy = CachePolicy::cached()
//!     .vary_on(VaryRule::Locale)
//!     .vary_on(VaryRule::Currency);
//! ```

mod error;
mod key;
mod memory;
mod policy;
mod store;

pub use error::*;
pub use key::*;
pub use memory::*;
pub use policy::*;
pub use store::*;
