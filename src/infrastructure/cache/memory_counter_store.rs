//! In-process hit counters backed by `DashMap`.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::repositories::{CounterStore, StorageResult};
use crate::utils::clock::SharedClock;

#[derive(Debug, Clone, Copy)]
struct Counter {
    hits: i64,
    expires_at: Option<i64>,
}

impl Counter {
    fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// In-memory [`CounterStore`] with clock-driven expiry.
///
/// Used when Redis is not configured or unreachable, and in tests. Expired
/// counters are dropped on the next access.
pub struct MemoryCounterStore {
    counters: DashMap<String, Counter>,
    clock: SharedClock,
}

impl MemoryCounterStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            counters: DashMap::new(),
            clock,
        }
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn init(&self, short_key: &str, ttl_seconds: Option<u64>) -> StorageResult<()> {
        let now = self.clock.unix_now();
        let expires_at = ttl_seconds.map(|ttl| now.saturating_add_unsigned(ttl));

        self.counters
            .insert(short_key.to_string(), Counter { hits: 0, expires_at });
        Ok(())
    }

    async fn increment(&self, short_key: &str) -> StorageResult<i64> {
        let now = self.clock.unix_now();

        let mut counter = self
            .counters
            .entry(short_key.to_string())
            .or_insert(Counter {
                hits: 0,
                expires_at: None,
            });

        // An expired counter behaves like a missing one: re-created without a TTL.
        if counter.is_expired_at(now) {
            *counter = Counter {
                hits: 0,
                expires_at: None,
            };
        }

        counter.hits += 1;
        Ok(counter.hits)
    }

    async fn get(&self, short_key: &str) -> StorageResult<Option<i64>> {
        let now = self.clock.unix_now();

        let removed = self
            .counters
            .remove_if(short_key, |_, counter| counter.is_expired_at(now));
        if removed.is_some() {
            return Ok(None);
        }

        Ok(self.counters.get(short_key).map(|counter| counter.hits))
    }

    async fn delete(&self, short_key: &str) -> StorageResult<()> {
        self.counters.remove(short_key);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;
    use chrono::Duration;
    use std::sync::Arc;

    fn store_at(unix: i64) -> (MemoryCounterStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_unix(unix));
        (MemoryCounterStore::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_init_starts_at_zero() {
        let (store, _) = store_at(1_700_000_000);

        store.init("0ALdg8GD", Some(60)).await.unwrap();
        assert_eq!(store.get("0ALdg8GD").await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_increment_counts_hits() {
        let (store, _) = store_at(1_700_000_000);

        store.init("0ALdg8GD", None).await.unwrap();
        for expected in 1..=3 {
            assert_eq!(store.increment("0ALdg8GD").await.unwrap(), expected);
        }
        assert_eq!(store.get("0ALdg8GD").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_increment_recreates_missing_counter_at_one() {
        let (store, _) = store_at(1_700_000_000);

        assert_eq!(store.increment("05osMj0Z").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_counter_expires_after_ttl() {
        let (store, clock) = store_at(1_700_000_000);

        store.init("0ALdg8GD", Some(60)).await.unwrap();
        store.increment("0ALdg8GD").await.unwrap();

        clock.advance(Duration::seconds(59));
        assert_eq!(store.get("0ALdg8GD").await.unwrap(), Some(1));

        clock.advance(Duration::seconds(1));
        assert_eq!(store.get("0ALdg8GD").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_increment_after_expiry_drops_ttl() {
        let (store, clock) = store_at(1_700_000_000);

        store.init("0ALdg8GD", Some(1)).await.unwrap();
        store.increment("0ALdg8GD").await.unwrap();

        clock.advance(Duration::seconds(5));
        assert_eq!(store.increment("0ALdg8GD").await.unwrap(), 1);

        clock.advance(Duration::days(365));
        assert_eq!(store.get("0ALdg8GD").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, _) = store_at(1_700_000_000);

        store.init("0ALdg8GD", None).await.unwrap();
        store.delete("0ALdg8GD").await.unwrap();
        store.delete("0ALdg8GD").await.unwrap();

        assert_eq!(store.get("0ALdg8GD").await.unwrap(), None);
    }
}
