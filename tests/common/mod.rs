#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shortkey::application::services::{DynShortenerService, ShortenerService};
use shortkey::domain::repositories::{CounterStore, MappingStore, StorageError, StorageResult};
use shortkey::infrastructure::cache::MemoryCounterStore;
use shortkey::infrastructure::persistence::MemoryMappingStore;
use shortkey::routes::router;
use shortkey::state::AppState;
use shortkey::utils::clock::ManualClock;
use shortkey::utils::key_generator::KeyGenerator;

pub const SECRET: &str = "test-secret";
pub const BASE_URL: &str = "http://sho.rt";
pub const NOW: i64 = 1_700_000_000;

/// Everything a handler test needs to drive and observe the service.
pub struct TestContext {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub mappings: Arc<MemoryMappingStore>,
    pub counters: Arc<SwitchableCounterStore>,
}

impl TestContext {
    pub fn server(&self) -> TestServer {
        TestServer::new(router(self.state.clone())).unwrap()
    }
}

pub fn create_test_context() -> TestContext {
    let clock = Arc::new(ManualClock::at_unix(NOW));
    let mappings = Arc::new(MemoryMappingStore::new(clock.clone()));
    let counters = Arc::new(SwitchableCounterStore::new(MemoryCounterStore::new(
        clock.clone(),
    )));

    let mapping_store: Arc<dyn MappingStore> = mappings.clone();
    let counter_store: Arc<dyn CounterStore> = counters.clone();

    let shortener: Arc<DynShortenerService> = Arc::new(ShortenerService::new(
        mapping_store,
        counter_store,
        KeyGenerator::new(SECRET),
        clock.clone(),
    ));

    TestContext {
        state: AppState::new(shortener, BASE_URL),
        clock,
        mappings,
        counters,
    }
}

/// Extracts the short key from a `short_url`.
pub fn key_of(short_url: &str) -> String {
    short_url
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// In-memory counter store that can be switched off to simulate an outage.
pub struct SwitchableCounterStore {
    inner: MemoryCounterStore,
    down: AtomicBool,
}

impl SwitchableCounterStore {
    pub fn new(inner: MemoryCounterStore) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(StorageError::unavailable("redis", "connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CounterStore for SwitchableCounterStore {
    async fn init(&self, short_key: &str, ttl_seconds: Option<u64>) -> StorageResult<()> {
        self.check()?;
        self.inner.init(short_key, ttl_seconds).await
    }

    async fn increment(&self, short_key: &str) -> StorageResult<i64> {
        self.check()?;
        self.inner.increment(short_key).await
    }

    async fn get(&self, short_key: &str) -> StorageResult<Option<i64>> {
        self.check()?;
        self.inner.get(short_key).await
    }

    async fn delete(&self, short_key: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.delete(short_key).await
    }

    async fn health_check(&self) -> bool {
        self.check().is_ok()
    }
}
