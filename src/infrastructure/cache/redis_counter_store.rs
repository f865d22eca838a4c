//! Redis-backed hit counters.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::repositories::{CounterStore, StorageError, StorageResult, with_deadline};

const STORE: &str = "redis";

/// Redis [`CounterStore`].
///
/// Counters are plain integer keys under the `hits:` namespace. `INCR` gives
/// per-key atomicity; the TTL set at [`CounterStore::init`] lets Redis reap
/// counters on its own.
pub struct RedisCounterStore {
    client: ConnectionManager,
    key_prefix: String,
    timeout: Duration,
}

impl RedisCounterStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is invalid, the connection cannot be
    /// established, or the PING fails.
    pub async fn connect(redis_url: &str, timeout: Duration) -> StorageResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            StorageError::unavailable(STORE, format!("Failed to create Redis client: {}", e))
        })?;

        let manager = with_deadline(STORE, timeout, ConnectionManager::new(client)).await?;

        let mut test_conn = manager.clone();
        with_deadline(STORE, timeout, test_conn.ping::<()>()).await?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "hits:".to_string(),
            timeout,
        })
    }

    fn build_key(&self, short_key: &str) -> String {
        format!("{}{}", self.key_prefix, short_key)
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn init(&self, short_key: &str, ttl_seconds: Option<u64>) -> StorageResult<()> {
        let key = self.build_key(short_key);
        let mut conn = self.client.clone();

        match ttl_seconds {
            Some(ttl) => {
                with_deadline(STORE, self.timeout, conn.set_ex::<_, _, ()>(&key, 0, ttl)).await?
            }
            None => with_deadline(STORE, self.timeout, conn.set::<_, _, ()>(&key, 0)).await?,
        }

        debug!("Counter INIT: {} (TTL: {:?})", short_key, ttl_seconds);
        Ok(())
    }

    async fn increment(&self, short_key: &str) -> StorageResult<i64> {
        let key = self.build_key(short_key);
        let mut conn = self.client.clone();

        let hits = with_deadline(STORE, self.timeout, conn.incr::<_, _, i64>(&key, 1)).await?;

        debug!("Counter INCR: {} -> {}", short_key, hits);
        Ok(hits)
    }

    async fn get(&self, short_key: &str) -> StorageResult<Option<i64>> {
        let key = self.build_key(short_key);
        let mut conn = self.client.clone();

        with_deadline(STORE, self.timeout, conn.get::<_, Option<i64>>(&key)).await
    }

    async fn delete(&self, short_key: &str) -> StorageResult<()> {
        let key = self.build_key(short_key);
        let mut conn = self.client.clone();

        let deleted = with_deadline(STORE, self.timeout, conn.del::<_, i32>(&key)).await?;
        if deleted > 0 {
            debug!("Counter DEL: {}", short_key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        with_deadline(STORE, self.timeout, conn.ping::<()>())
            .await
            .is_ok()
    }
}
