//! Store trait for the durable short key to URL mapping.

use async_trait::async_trait;

use super::error::StorageResult;
use crate::domain::entities::UrlMapping;

/// Durable, authoritative storage of [`UrlMapping`] records.
///
/// Implementations own key uniqueness: [`insert_if_absent`](Self::insert_if_absent)
/// is the only collision test the service relies on.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingStore`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryMappingStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Persists a mapping unless `short_key` is held by a live record.
    ///
    /// A record whose expiry has already passed does not hold its key; it is
    /// replaced. Must be atomic with respect to concurrent inserts of the same
    /// key: of two racing inserts at most one returns `Ok(true)`.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the mapping was written
    /// - `Ok(false)` if the key is taken (nothing written)
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`](super::StorageError) when the store is unreachable.
    async fn insert_if_absent(
        &self,
        short_key: &str,
        original_url: &str,
        expiry: Option<i64>,
    ) -> StorageResult<bool>;

    /// Looks up a mapping by key, expired or not.
    ///
    /// Expiry interpretation is left to the caller.
    async fn lookup(&self, short_key: &str) -> StorageResult<Option<UrlMapping>>;

    /// Hard-deletes a mapping. Deleting a missing key is not an error.
    async fn delete(&self, short_key: &str) -> StorageResult<()>;

    /// Deletes the mapping only if it still carries `expiry`.
    ///
    /// Lets a lazy reaper remove the record it saw expire without touching a
    /// live mapping that replaced it in the meantime.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if a record was deleted.
    async fn delete_expired(&self, short_key: &str, expiry: i64) -> StorageResult<bool>;

    /// Checks that the store is reachable.
    async fn health_check(&self) -> bool;
}
