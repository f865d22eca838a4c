use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use shortkey::domain::repositories::MappingStore;
use shortkey::infrastructure::persistence::PgMappingStore;
use shortkey::utils::clock::ManualClock;

const NOW: i64 = 1_700_000_000;

fn store(pool: PgPool) -> (PgMappingStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at_unix(NOW));
    let store = PgMappingStore::new(Arc::new(pool), clock.clone(), StdDuration::from_secs(5));
    (store, clock)
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_and_lookup(pool: PgPool) {
    let (store, _) = store(pool);

    let inserted = store
        .insert_if_absent("0ALdg8GD", "https://example.com", Some(NOW + 60))
        .await
        .unwrap();
    assert!(inserted);

    let mapping = store.lookup("0ALdg8GD").await.unwrap().unwrap();
    assert_eq!(mapping.short_key, "0ALdg8GD");
    assert_eq!(mapping.original_url, "https://example.com");
    assert_eq!(mapping.expiry, Some(NOW + 60));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_conflict_keeps_first(pool: PgPool) {
    let (store, _) = store(pool);

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

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_replaces_expired_row(pool: PgPool) {
    let (store, clock) = store(pool);

    store
        .insert_if_absent("0ALdg8GD", "https://old.example", Some(NOW + 1))
        .await
        .unwrap();

    clock.advance(Duration::seconds(5));

    assert!(
        store
            .insert_if_absent("0ALdg8GD", "https://new.example", None)
            .await
            .unwrap()
    );
    let mapping = store.lookup("0ALdg8GD").await.unwrap().unwrap();
    assert_eq!(mapping.original_url, "https://new.example");
    assert_eq!(mapping.expiry, None);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_is_idempotent(pool: PgPool) {
    let (store, _) = store(pool);

    store
        .insert_if_absent("0ALdg8GD", "https://example.com", None)
        .await
        .unwrap();

    store.delete("0ALdg8GD").await.unwrap();
    store.delete("0ALdg8GD").await.unwrap();

    assert!(store.lookup("0ALdg8GD").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_expired_only_matches_observed_expiry(pool: PgPool) {
    let (store, clock) = store(pool);

    store
        .insert_if_absent("0ALdg8GD", "https://old.example", Some(NOW + 1))
        .await
        .unwrap();
    clock.advance(Duration::seconds(5));
    store
        .insert_if_absent("0ALdg8GD", "https://new.example", None)
        .await
        .unwrap();

    assert!(!store.delete_expired("0ALdg8GD", NOW + 1).await.unwrap());
    assert!(store.lookup("0ALdg8GD").await.unwrap().is_some());

    store
        .insert_if_absent("1BMeh9HE", "https://example.com", Some(NOW + 2))
        .await
        .unwrap();
    assert!(store.delete_expired("1BMeh9HE", NOW + 2).await.unwrap());
    assert!(store.lookup("1BMeh9HE").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_purge_expired_and_summary(pool: PgPool) {
    let (store, clock) = store(pool);

    store
        .insert_if_absent("0ALdg8GD", "https://a.example", Some(NOW + 1))
        .await
        .unwrap();
    store
        .insert_if_absent("05osMj0Z", "https://b.example", Some(NOW + 3600))
        .await
        .unwrap();
    store
        .insert_if_absent("0H97W0yt", "https://c.example", None)
        .await
        .unwrap();

    clock.advance(Duration::seconds(10));

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.expiring, 2);
    assert_eq!(summary.expired, 1);

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert!(store.lookup("0ALdg8GD").await.unwrap().is_none());
    assert!(store.lookup("05osMj0Z").await.unwrap().is_some());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_health_check(pool: PgPool) {
    let (store, _) = store(pool);
    assert!(store.health_check().await);
}
