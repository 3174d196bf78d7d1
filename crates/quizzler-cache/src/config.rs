//! Key-value store configuration.
//!
//! This module provides connection and TTL settings for the shared store,
//! loaded from environment variables.

use std::env;
use std::time::Duration;

/// Default lifetime of a cache entry: 3 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// Store configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `REDIS_HOST`: Redis host (default: `redis`)
/// - `REDIS_PORT`: Redis port (default: `6379`)
/// - `REDIS_DB`: Logical database index (default: `0`)
/// - `CACHE_TTL_SECONDS`: Default TTL for cached items in seconds (default: `10800`)
/// - `CACHE_PROBE_TIMEOUT_MS`: Upper bound for the liveness probe (default: `200`)
/// - `CACHE_CONNECT_TIMEOUT_MS`: Upper bound for establishing the connection (default: `1000`)
/// - `CACHE_COMMAND_TIMEOUT_MS`: Upper bound for a single command's reply (default: `500`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,

    /// Default time-to-live for cached items.
    pub default_ttl: Duration,

    /// How long `is_available` may wait for a `PING` reply.
    pub probe_timeout: Duration,

    /// How long a connection attempt may take before the store counts as down.
    pub connect_timeout: Duration,

    /// How long any single store command may wait for its reply.
    pub command_timeout: Duration,
}

impl CacheConfig {
    /// Load configuration from environment variables, falling back to
    /// [`CacheConfig::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_host: env::var("REDIS_HOST")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.redis_host),
            redis_port: env::var("REDIS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.redis_port),
            redis_db: env::var("REDIS_DB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.redis_db),
            default_ttl: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            probe_timeout: env::var("CACHE_PROBE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.probe_timeout),
            connect_timeout: env::var("CACHE_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            command_timeout: env::var("CACHE_COMMAND_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.command_timeout),
        }
    }

    /// Connection URL for the configured host, port and database.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = CacheConfig::default();
    /// assert_eq!(config.redis_url(), "redis://redis:6379/0");
    /// ```
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_host: "redis".into(),
            redis_port: 6379,
            redis_db: 0,
            default_ttl: DEFAULT_TTL,
            probe_timeout: Duration::from_millis(200),
            connect_timeout: Duration::from_millis(1000),
            command_timeout: Duration::from_millis(500),
        }
    }
}
