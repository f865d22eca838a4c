//! Store trait for per-key hit counters.

use async_trait::async_trait;

use super::error::StorageResult;

/// Fast, ephemeral hit counters keyed by short key.
///
/// Counters expire on their own (set at [`init`](Self::init)) and are not
/// transactionally linked to the mapping store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCounterStore`] - Redis `INCR`-based counters
/// - [`crate::infrastructure::cache::MemoryCounterStore`] - In-process counters
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Creates (or resets) the counter at 0.
    ///
    /// `ttl_seconds = None` means the counter never expires on its own.
    async fn init(&self, short_key: &str, ttl_seconds: Option<u64>) -> StorageResult<()>;

    /// Atomically increments and returns the new value.
    ///
    /// A missing counter is re-created at 1 without a TTL.
    async fn increment(&self, short_key: &str) -> StorageResult<i64>;

    /// Current count, or `None` if the counter is absent or expired.
    async fn get(&self, short_key: &str) -> StorageResult<Option<i64>>;

    /// Removes the counter. Deleting a missing key is not an error.
    async fn delete(&self, short_key: &str) -> StorageResult<()>;

    /// Checks that the store is reachable.
    async fn health_check(&self) -> bool;
}
