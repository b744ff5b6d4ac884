//! Cache error types.

use thiserror::Error;

/// Errors a cache backend can report.
///
/// The execution pipeline treats every cache error as a miss, so a broken
/// cache degrades to uncached behavior instead of failing calls.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to serialize value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
