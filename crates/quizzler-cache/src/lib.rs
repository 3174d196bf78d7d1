//! # Quizzler Cache
//!
//! Shared key-value store plumbing for the Quizzler API.
//!
//! This crate provides:
//! - The [`KeyValueStore`] seam, with a Redis implementation and an in-memory
//!   one for tests
//! - A typed [`Cache`] façade (get, set, delete, invalidate by prefix,
//!   atomic increment, liveness probe, read-through)
//! - Cache key naming and invalidation helpers
//! - A fixed-window [`RateLimiter`] that fails open
//! - Store configuration from environment variables
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quizzler_cache::{Cache, CacheConfig, RedisStore, keys};
//!
//! let config = CacheConfig::from_env();
//! let cache = Cache::new(Arc::new(RedisStore::new(&config)?), &config);
//!
//! cache.set(&keys::deck(1), &deck).await?;
//! let deck: Deck = cache.get(&keys::deck(1)).await?;
//! ```

pub mod cache;
pub mod config;
pub mod keys;
pub mod memory;
pub mod rate_limit;
pub mod redis;
pub mod store;

pub use cache::{Cache, CacheError};
pub use config::CacheConfig;
pub use keys::invalidate;
pub use memory::MemoryStore;
pub use rate_limit::{Decision, RateLimiter};
pub use self::redis::RedisStore;
pub use store::{KeyValueStore, StoreError, ttl_secs};
