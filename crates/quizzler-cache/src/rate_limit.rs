//! Fixed-window rate limiting over the shared store.
//!
//! Each (route, client) pair owns one counter. The first request in a window
//! creates it with the window as TTL; later requests only increment. When the
//! store is down or errors, requests are admitted: an outage of the store must
//! never become an outage of the API.

use std::time::Duration;

use tracing::{debug, warn};

use crate::Cache;
use crate::keys;
use crate::store::ttl_secs;

/// Outcome of one admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    /// Requests left in the current window after this one.
    pub remaining: u32,
    /// Set on denial: seconds the client should wait.
    pub retry_after_secs: Option<u64>,
}

impl Decision {
    fn fail_open(limit: u32) -> Self {
        Self {
            allowed: true,
            limit,
            remaining: limit,
            retry_after_secs: None,
        }
    }
}

/// Per-route limiter: at most `limit` requests per client per `window`.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    cache: Cache,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(cache: Cache, limit: u32, window: Duration) -> Self {
        Self {
            cache,
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts one request from `client` on `route` and decides whether to admit it.
    pub async fn admit(&self, route: &str, client: &str) -> Decision {
        if !self.cache.is_available().await {
            debug!(route = %route, "Store unavailable, rate limit not enforced");
            return Decision::fail_open(self.limit);
        }

        let key = keys::rate_limit(route, client);
        let count = match self.cache.increment(&key, self.window).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, route = %route, "Rate limit counter failed, admitting request");
                return Decision::fail_open(self.limit);
            }
        };

        let limit = i64::from(self.limit);
        if count > limit {
            debug!(route = %route, client = %client, count = %count, "Rate limit exceeded");
            return Decision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                retry_after_secs: Some(ttl_secs(self.window)),
            };
        }

        Decision {
            allowed: true,
            limit: self.limit,
            remaining: u32::try_from(limit - count).unwrap_or(0),
            retry_after_secs: None,
        }
    }
}
