//! In-process implementation of [`KeyValueStore`].
//!
//! Backed by a [`DashMap`], whose per-shard locking makes a single-key
//! read-modify-write atomic. Expiry is lazy and measured on tokio's clock, so
//! tests running with a paused runtime can step through TTL windows.
//!
//! [`MemoryStore::set_available`] turns the store off and on to simulate an
//! outage of the shared store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;

use crate::store::{KeyValueStore, StoreError, ttl_secs};

#[derive(Clone, Debug)]
struct StoredValue {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs(ttl))),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    entries: DashMap<String, StoredValue>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the store going down (`false`) or coming back (`true`).
    /// Stored data survives an outage.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Remaining lifetime of `key`, if it exists and has one.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store switched off".to_string()))
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.ensure_available()?;
        let now = Instant::now();

        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.data.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        // Expired: reclaim it, unless a writer replaced it in the meantime.
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.ensure_available()?;
        self.entries
            .insert(key.to_string(), StoredValue::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.ensure_available()?;
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired(now)))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        self.ensure_available()?;
        let now = Instant::now();
        let mut deleted = 0;

        self.entries.retain(|key, entry| {
            if !key.starts_with(prefix) {
                return true;
            }
            if !entry.is_expired(now) {
                deleted += 1;
            }
            false
        });

        Ok(deleted)
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<i64, StoreError> {
        self.ensure_available()?;
        let now = Instant::now();

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if !occupied.get().is_expired(now) => {
                let current = std::str::from_utf8(&occupied.get().data)
                    .ok()
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .ok_or_else(|| StoreError::NotAnInteger(key.to_string()))?;
                let next = current + 1;
                occupied.get_mut().data = next.to_string().into_bytes();
                Ok(next)
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(StoredValue::new(b"1".to_vec(), ttl));
                Ok(1)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(b"1".to_vec(), ttl));
                Ok(1)
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.ensure_available()?;
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store
            .set_with_ttl("quizzler:card:1", b"front".to_vec(), TTL)
            .await
            .unwrap();

        assert_eq!(
            store.get("quizzler:card:1").await.unwrap(),
            Some(b"front".to_vec())
        );
        assert_eq!(store.get("quizzler:card:2").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = MemoryStore::new();
        store
            .set_with_ttl("quizzler:card:1", b"front".to_vec(), TTL)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.exists("quizzler:card:1").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!store.exists("quizzler:card:1").await.unwrap());
        assert_eq!(store.get("quizzler:card:1").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_increment_keeps_first_ttl() {
        let store = MemoryStore::new();
        let key = "quizzler:ratelimit:/login:10.0.0.1";

        assert_eq!(store.increment(key, TTL).await.unwrap(), 1);
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.increment(key, TTL).await.unwrap(), 2);

        // The second increment must not have pushed expiry out.
        assert_eq!(store.ttl(key), Some(Duration::from_secs(30)));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.increment(key, TTL).await.unwrap(), 1);
        assert_eq!(store.ttl(key), Some(TTL));
    }

    #[tokio::test]
    async fn test_increment_rejects_non_integer() {
        let store = MemoryStore::new();
        store
            .set_with_ttl("quizzler:user:1", b"{}".to_vec(), TTL)
            .await
            .unwrap();

        assert!(matches!(
            store.increment("quizzler:user:1", TTL).await,
            Err(StoreError::NotAnInteger(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_prefix_is_literal() {
        let store = MemoryStore::new();
        for key in [
            "quizzler:deck:1",
            "quizzler:deck:1:cards",
            "quizzler:deck:10",
            "quizzler:card:1",
        ] {
            store.set_with_ttl(key, b"x".to_vec(), TTL).await.unwrap();
        }

        assert_eq!(store.delete_by_prefix("quizzler:deck:1:").await.unwrap(), 1);
        assert!(store.exists("quizzler:deck:1").await.unwrap());
        assert!(store.exists("quizzler:deck:10").await.unwrap());
        assert!(store.exists("quizzler:card:1").await.unwrap());

        assert_eq!(store.delete_by_prefix("quizzler:deck:*").await.unwrap(), 0);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_switched_off_store_fails_every_call() {
        let store = MemoryStore::new();
        store
            .set_with_ttl("quizzler:card:1", b"front".to_vec(), TTL)
            .await
            .unwrap();
        store.set_available(false);

        assert!(store.ping().await.is_err());
        assert!(store.get("quizzler:card:1").await.is_err());
        assert!(store.increment("quizzler:x", TTL).await.is_err());

        store.set_available(true);
        assert_eq!(
            store.get("quizzler:card:1").await.unwrap(),
            Some(b"front".to_vec())
        );
    }
}
