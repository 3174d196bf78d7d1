//! Typed cache façade over a [`KeyValueStore`].
//!
//! Values are stored as JSON. The cache is look-aside and never the system of
//! record: every [`CacheError`] means "go to the authoritative store", and
//! [`Cache::get_or_load`] does exactly that.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::config::CacheConfig;
use crate::store::{KeyValueStore, StoreError};

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache miss")]
    Miss,

    #[error("Failed to encode value: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("Failed to decode cached value: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CacheError {
    /// Whether a read failure should be handled as an ordinary miss.
    ///
    /// True for every variant a `get` can produce: absent, undecodable and
    /// unreachable entries all send the caller to the source of truth.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss | Self::Decoding(_) | Self::Store(_))
    }
}

/// Shared cache handle.
///
/// Cheap to clone; all clones share one store connection.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    default_ttl: Duration,
    probe_timeout: Duration,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("default_ttl", &self.default_ttl)
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}

impl Cache {
    /// Wraps `store` with the TTL and probe timeout from `config`.
    pub fn new(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            default_ttl: config.default_ttl,
            probe_timeout: config.probe_timeout,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Gets a cached value by key.
    ///
    /// # Errors
    ///
    /// - `CacheError::Miss` if the key is absent or expired
    /// - `CacheError::Decoding` if the stored bytes are not a valid `T`
    /// - `CacheError::Store` if the store could not be reached
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: DeserializeOwned,
    {
        let Some(bytes) = self.store.get(key).await? else {
            debug!(cache.key = %key, "Cache miss");
            return Err(CacheError::Miss);
        };

        debug!(cache.key = %key, "Cache hit");
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(cache.key = %key, error = %e, "Failed to deserialize cached value");
            CacheError::Decoding(e)
        })
    }

    /// Sets a cached value with the default TTL.
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize + ?Sized,
    {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Sets a cached value with a custom TTL.
    #[instrument(skip(self, value), fields(cache.operation = "SET"))]
    pub async fn set_with_ttl<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_vec(value).map_err(CacheError::Encoding)?;
        self.store.set_with_ttl(key, json, ttl).await?;

        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");

        Ok(())
    }

    /// Invalidates (deletes) a cached key.
    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key).await?;

        debug!(cache.key = %key, "Cache invalidated");

        Ok(())
    }

    /// Invalidates every key starting with `prefix`. Returns how many were removed.
    #[instrument(skip(self), fields(cache.operation = "DEL_PREFIX"))]
    pub async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        Ok(self.store.delete_by_prefix(prefix).await?)
    }

    /// Atomically increments the counter at `key`.
    ///
    /// `ttl` is attached only when this call creates the key; later increments
    /// leave the expiry alone, which makes the counter a fixed window.
    #[instrument(skip(self), fields(cache.operation = "INCR"))]
    pub async fn increment(&self, key: &str, ttl: Duration) -> Result<i64, CacheError> {
        Ok(self.store.increment(key, ttl).await?)
    }

    /// Checks if a key exists in the cache. Store errors read as `false`.
    pub async fn exists(&self, key: &str) -> bool {
        match self.store.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Store EXISTS error");
                false
            }
        }
    }

    /// Liveness probe: one `PING`, bounded by the configured probe timeout.
    pub async fn is_available(&self) -> bool {
        match tokio::time::timeout(self.probe_timeout, self.store.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "Store probe failed");
                false
            }
            Err(_) => {
                debug!(
                    timeout_ms = %self.probe_timeout.as_millis(),
                    "Store probe timed out"
                );
                false
            }
        }
    }

    /// Read-through lookup.
    ///
    /// Returns the cached value when there is a usable one. Otherwise runs
    /// `load` against the authoritative source, writes the result back with
    /// `ttl`, and returns it. Cache failures are logged, never returned; only
    /// `load`'s own error reaches the caller.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &str, ttl: Duration, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get::<T>(key).await {
            Ok(value) => return Ok(value),
            Err(CacheError::Miss) => {}
            Err(e) => debug!(cache.key = %key, error = %e, "Cache read failed, loading from source"),
        }

        let value = load().await?;

        if let Err(e) = self.set_with_ttl(key, &value, ttl).await {
            warn!(cache.key = %key, error = %e, "Failed to populate cache");
        }

        Ok(value)
    }
}
