//! The key-value store seam.
//!
//! Everything above this module (the cache façade, the rate limiter) talks to
//! the shared store through [`KeyValueStore`], so production code runs against
//! [`RedisStore`](crate::RedisStore) while tests inject a
//! [`MemoryStore`](crate::MemoryStore).

use std::time::Duration;

use async_trait::async_trait;

/// Error type for store operations.
///
/// Every variant is recoverable from the caller's point of view: the store is
/// auxiliary infrastructure and its failures must never fail a request.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("value at {0} is not an integer")]
    NotAnInteger(String),
}

/// Operations the admission layer needs from the shared store.
///
/// Implementations must make [`increment`](KeyValueStore::increment)
/// linearizable per key, and must attach its TTL in the same atomic step that
/// creates the counter.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Raw bytes stored at `key`, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` at `key`, replacing any previous value and TTL.
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration)
    -> Result<(), StoreError>;

    /// Removes `key`. Returns whether something was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Removes every key that starts with `prefix` (literal match).
    /// Returns the number of keys removed.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, StoreError>;

    /// Increments the integer at `key` and returns the new value.
    ///
    /// A missing key starts at 0 and receives `ttl`. An existing key keeps its
    /// remaining TTL.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<i64, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// One round trip to the store.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Converts a TTL to the whole seconds stored alongside a key: rounded up,
/// never below one second.
pub fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_secs_rounds_up() {
        assert_eq!(ttl_secs(Duration::from_secs(60)), 60);
        assert_eq!(ttl_secs(Duration::from_millis(60_001)), 61);
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::ZERO), 1);
    }
}
