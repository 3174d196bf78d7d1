//! Redis implementation of [`KeyValueStore`].
//!
//! The connection is established lazily and shared by all requests through a
//! multiplexed [`ConnectionManager`], which also reconnects after Redis
//! restarts. A failed first connection does not poison the store: the next
//! call after a short back-off tries again, so the API may start before Redis.
//!
//! Requests that queue behind a connection attempt share its outcome instead of
//! each trying again, and every command is bounded by `command_timeout`, so a
//! hung Redis costs a request at most one timeout.

use std::future::Future;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::config::CacheConfig;
use crate::store::{KeyValueStore, StoreError, ttl_secs};

/// How long to skip connection attempts after one failed.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// `INCR` and the first-hit `EXPIRE` as one atomic step, so a counter can never
/// exist without its TTL.
static INCREMENT_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
",
    )
});

/// Redis-backed store with a lazily established, shared connection.
pub struct RedisStore {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    connect_timeout: Duration,
    command_timeout: Duration,
    started: Instant,
    /// Milliseconds since `started` before which no connection attempt is made.
    retry_at_ms: AtomicU64,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("connected", &self.conn.initialized())
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Creates a store for the configured Redis instance without connecting.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Redis` if the connection URL is invalid.
    pub fn new(config: &CacheConfig) -> Result<Self, StoreError> {
        Self::open(
            &config.redis_url(),
            config.connect_timeout,
            config.command_timeout,
        )
    }

    /// Creates a store for an explicit Redis URL without connecting.
    pub fn open(
        redis_url: &str,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client,
            conn: OnceCell::new(),
            connect_timeout,
            command_timeout,
            started: Instant::now(),
            retry_at_ms: AtomicU64::new(0),
        })
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn backing_off(&self) -> Result<(), StoreError> {
        if self.elapsed_ms() < self.retry_at_ms.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(
                "waiting before reconnecting".to_string(),
            ));
        }
        Ok(())
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn.clone());
        }

        self.backing_off()?;

        let conn = self
            .conn
            .get_or_try_init(|| async {
                // Callers queued behind an attempt that just failed land here
                // once it finishes; they must not start another one.
                if let Err(e) = self.backing_off() {
                    return Err(e);
                }

                let connect = ConnectionManager::new(self.client.clone());
                let result = match tokio::time::timeout(self.connect_timeout, connect).await {
                    Ok(Ok(conn)) => Ok(conn),
                    Ok(Err(e)) => Err(StoreError::from(e)),
                    Err(_) => Err(StoreError::Unavailable(format!(
                        "connect timed out after {}ms",
                        self.connect_timeout.as_millis()
                    ))),
                };

                match &result {
                    Ok(_) => info!("Connected to Redis"),
                    Err(e) => {
                        let retry_at = self.elapsed_ms() + RECONNECT_BACKOFF.as_millis() as u64;
                        self.retry_at_ms.store(retry_at, Ordering::Relaxed);
                        warn!(error = %e, "Failed to connect to Redis");
                    }
                }

                result
            })
            .await?;

        Ok(conn.clone())
    }

    /// Awaits one command, giving up after `command_timeout`.
    async fn bounded<T>(
        &self,
        command: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.command_timeout, command).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Unavailable(format!(
                "no reply within {}ms",
                self.command_timeout.as_millis()
            ))),
        }
    }
}

/// Escapes glob metacharacters so `prefix` is matched literally by `SCAN MATCH`.
fn glob_escape(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl KeyValueStore for RedisStore {
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = self.bounded(conn.get(key)).await?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        self.bounded(conn.set_ex::<_, _, ()>(key, value, ttl_secs(ttl)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let removed: u64 = self.bounded(conn.del(key)).await?;
        Ok(removed > 0)
    }

    /// Uses SCAN, which is safe for production but may be slow with many keys.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", glob_escape(prefix));
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let mut scan = redis::cmd("SCAN");
            scan.arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100);
            let (next_cursor, keys): (u64, Vec<String>) =
                self.bounded(scan.query_async(&mut conn)).await?;

            if !keys.is_empty() {
                let count: u64 = self.bounded(conn.del(&keys)).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Prefix invalidation complete");

        Ok(deleted)
    }

    #[instrument(skip(self), fields(cache.operation = "INCR"))]
    async fn increment(&self, key: &str, ttl: Duration) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        let mut invocation = INCREMENT_SCRIPT.key(key);
        invocation.arg(ttl_secs(ttl));
        let count: i64 = self.bounded(invocation.invoke_async(&mut conn)).await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(cache.operation = "EXISTS"))]
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let present: bool = self.bounded(conn.exists(key)).await?;
        Ok(present)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let ping = redis::cmd("PING");
        let _: String = self.bounded(ping.query_async(&mut conn)).await?;
        Ok(())
    }
}
