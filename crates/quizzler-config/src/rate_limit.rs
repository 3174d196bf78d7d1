//! Rate limiting configuration for API endpoints.
//!
//! Limits are fixed-window counters kept in the shared key-value store. This
//! module only carries the numbers; the router hands them to each
//! `RateLimiter` it builds.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_WINDOW_SECONDS`: Window length (default: 60)
//! - `RATE_LIMIT_AUTH_MAX_REQUESTS`: Ceiling per window for login/registration (default: 10)
//! - `RATE_LIMIT_GENERAL_MAX_REQUESTS`: Ceiling per window for other API routes (default: 100)
//!
//! Counters are keyed by route and client address, so each client gets its own
//! budget on each route.

use std::time::Duration;

/// Rate limit configuration for the API.
///
/// Authentication endpoints get a much lower ceiling than the rest of the API
/// to slow down credential stuffing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Length of one fixed window.
    pub window: Duration,

    /// Requests allowed per window on authentication endpoints.
    pub auth_max_requests: u32,

    /// Requests allowed per window on every other rate-limited endpoint.
    pub general_max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            auth_max_requests: 10,
            general_max_requests: 100,
        }
    }
}

impl RateLimitConfig {
    /// Creates a new `RateLimitConfig` from environment variables.
    ///
    /// Falls back to default values if environment variables are not set
    /// or cannot be parsed. A zero-length window is treated as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            window: std::env::var("RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
            auth_max_requests: std::env::var("RATE_LIMIT_AUTH_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_max_requests),
            general_max_requests: std::env::var("RATE_LIMIT_GENERAL_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.general_max_requests),
        }
    }
}
