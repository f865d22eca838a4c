//! In-process mapping store backed by `DashMap`.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::domain::entities::UrlMapping;
use crate::domain::repositories::{MappingStore, StorageResult};
use crate::utils::clock::SharedClock;

/// In-memory [`MappingStore`].
///
/// The check-then-insert runs under the shard lock held by the map entry, so
/// concurrent inserts of one key are linearizable. Nothing survives a restart.
pub struct MemoryMappingStore {
    mappings: DashMap<String, UrlMapping>,
    clock: SharedClock,
}

impl MemoryMappingStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            mappings: DashMap::new(),
            clock,
        }
    }

    /// Number of stored records, expired ones included.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn insert_if_absent(
        &self,
        short_key: &str,
        original_url: &str,
        expiry: Option<i64>,
    ) -> StorageResult<bool> {
        let now = self.clock.unix_now();
        let mapping = UrlMapping::new(short_key, original_url, expiry);

        let inserted = match self.mappings.entry(short_key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired_at(now) {
                    debug!("Replacing expired mapping {}", short_key);
                    occupied.insert(mapping);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(mapping);
                true
            }
        };

        Ok(inserted)
    }

    async fn lookup(&self, short_key: &str) -> StorageResult<Option<UrlMapping>> {
        Ok(self
            .mappings
            .get(short_key)
            .map(|entry| entry.value().clone()))
    }

    async fn delete(&self, short_key: &str) -> StorageResult<()> {
        self.mappings.remove(short_key);
        Ok(())
    }

    async fn delete_expired(&self, short_key: &str, expiry: i64) -> StorageResult<bool> {
        Ok(self
            .mappings
            .remove_if(short_key, |_, mapping| mapping.expiry == Some(expiry))
            .is_some())
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

    fn store_at(unix: i64) -> (MemoryMappingStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_unix(unix));
        (MemoryMappingStore::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_insert_then_lookup() {
        let (store, _) = store_at(1_700_000_000);

        assert!(
            store
                .insert_if_absent("0ALdg8GD", "https://example.com", Some(1_700_000_060))
                .await
                .unwrap()
        );

        let mapping = store.lookup("0ALdg8GD").await.unwrap().unwrap();
        assert_eq!(mapping.original_url, "https://example.com");
        assert_eq!(mapping.expiry, Some(1_700_000_060));
    }

    #[tokio::test]
    async fn test_live_key_is_not_overwritten() {
        let (store, _) = store_at(1_700_000_000);

        assert!(
            store
                .insert_if_absent("0ALdg8GD", "https://first.example", None)
                .await
                .unwrap()
        );
        assert!(
            !store
                .insert_if_absent("0ALdg8GD", "https://second.example", None)
                .await
                .unwrap()
        );

        let mapping = store.lookup("0ALdg8GD").await.unwrap().unwrap();
        assert_eq!(mapping.original_url, "https://first.example");
    }

    #[tokio::test]
    async fn test_expired_key_is_replaced() {
        let (store, clock) = store_at(1_700_000_000);

        store
            .insert_if_absent("0ALdg8GD", "https://old.example", Some(1_700_000_001))
            .await
            .unwrap();

        clock.advance(Duration::seconds(2));

        assert!(
            store
                .insert_if_absent("0ALdg8GD", "https://new.example", None)
                .await
                .unwrap()
        );
        let mapping = store.lookup("0ALdg8GD").await.unwrap().unwrap();
        assert_eq!(mapping.original_url, "https://new.example");
    }

    #[tokio::test]
    async fn test_lookup_returns_expired_records() {
        let (store, clock) = store_at(1_700_000_000);

        store
            .insert_if_absent("0ALdg8GD", "https://example.com", Some(1_700_000_001))
            .await
            .unwrap();
        clock.advance(Duration::seconds(10));

        let mapping = store.lookup("0ALdg8GD").await.unwrap();
        assert!(mapping.is_some());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, _) = store_at(1_700_000_000);

        store
            .insert_if_absent("0ALdg8GD", "https://example.com", None)
            .await
            .unwrap();

        store.delete("0ALdg8GD").await.unwrap();
        store.delete("0ALdg8GD").await.unwrap();

        assert!(store.lookup("0ALdg8GD").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_expired_spares_replacement() {
        let (store, clock) = store_at(1_700_000_000);

        store
            .insert_if_absent("0ALdg8GD", "https://old.example", Some(1_700_000_001))
            .await
            .unwrap();
        clock.advance(Duration::seconds(2));

        // Replaced between the reaper's lookup and its delete.
        store
            .insert_if_absent("0ALdg8GD", "https://new.example", None)
            .await
            .unwrap();

        assert!(
            !store
                .delete_expired("0ALdg8GD", 1_700_000_001)
                .await
                .unwrap()
        );
        let mapping = store.lookup("0ALdg8GD").await.unwrap().unwrap();
        assert_eq!(mapping.original_url, "https://new.example");
    }

    #[tokio::test]
    async fn test_delete_expired_removes_matching_record() {
        let (store, _) = store_at(1_700_000_000);

        store
            .insert_if_absent("0ALdg8GD", "https://example.com", Some(1_699_999_999))
            .await
            .unwrap();

        assert!(
            store
                .delete_expired("0ALdg8GD", 1_699_999_999)
                .await
                .unwrap()
        );
        assert!(store.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_of_one_key_admit_one_writer() {
        let (store, _) = store_at(1_700_000_000);
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_if_absent("0ALdg8GD", &format!("https://{}.example", i), None)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
