//! PostgreSQL implementation of the mapping store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::domain::entities::UrlMapping;
use crate::domain::repositories::{MappingStore, StorageResult, with_deadline};
use crate::utils::clock::SharedClock;

const STORE: &str = "postgres";

#[derive(sqlx::FromRow)]
struct MappingRow {
    short_key: String,
    original_url: String,
    expiry: Option<i64>,
}

impl From<MappingRow> for UrlMapping {
    fn from(row: MappingRow) -> Self {
        UrlMapping::new(row.short_key, row.original_url, row.expiry)
    }
}

/// PostgreSQL store for URL mappings.
///
/// Key uniqueness is enforced by the `url_mappings_short_key_key` unique
/// constraint; [`MappingStore::insert_if_absent`] relies on
/// `ON CONFLICT DO NOTHING` against it.
pub struct PgMappingStore {
    pool: Arc<PgPool>,
    clock: SharedClock,
    timeout: Duration,
}

impl PgMappingStore {
    /// Creates a new store over a connection pool.
    ///
    /// `clock` decides which existing rows are dead when an insert hits their key;
    /// `timeout` bounds every query.
    pub fn new(pool: Arc<PgPool>, clock: SharedClock, timeout: Duration) -> Self {
        Self {
            pool,
            clock,
            timeout,
        }
    }
}

/// Row counts reported by [`PgMappingStore::summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingSummary {
    pub total: i64,
    /// Mappings with an expiry, live or not.
    pub expiring: i64,
    /// Mappings past their expiry that no redirect has reaped yet.
    pub expired: i64,
}

impl PgMappingStore {
    /// Deletes every mapping past its expiry and returns how many were removed.
    ///
    /// Redirects reap expired rows one at a time; this sweeps the rest.
    pub async fn purge_expired(&self) -> StorageResult<u64> {
        let now = self.clock.unix_now();

        let result = with_deadline(
            STORE,
            self.timeout,
            sqlx::query("DELETE FROM url_mappings WHERE expiry IS NOT NULL AND expiry < $1")
                .bind(now)
                .execute(self.pool.as_ref()),
        )
        .await?;

        info!("Purged {} expired mappings", result.rows_affected());
        Ok(result.rows_affected())
    }

    pub async fn summary(&self) -> StorageResult<MappingSummary> {
        let now = self.clock.unix_now();

        let (total, expiring, expired) = with_deadline(
            STORE,
            self.timeout,
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(expiry),
                    COUNT(*) FILTER (WHERE expiry < $1)
                FROM url_mappings
                "#,
            )
            .bind(now)
            .fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(MappingSummary {
            total,
            expiring,
            expired,
        })
    }
}

#[async_trait]
impl MappingStore for PgMappingStore {
    async fn insert_if_absent(
        &self,
        short_key: &str,
        original_url: &str,
        expiry: Option<i64>,
    ) -> StorageResult<bool> {
        let now = self.clock.unix_now();

        let inserted = with_deadline(STORE, self.timeout, async {
            let mut tx = self.pool.begin().await?;

            // A dead row must not hold its key.
            sqlx::query(
                r#"
                DELETE FROM url_mappings
                WHERE short_key = $1 AND expiry IS NOT NULL AND expiry < $2
                "#,
            )
            .bind(short_key)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let result = sqlx::query(
                r#"
                INSERT INTO url_mappings (short_key, original_url, expiry)
                VALUES ($1, $2, $3)
                ON CONFLICT (short_key) DO NOTHING
                "#,
            )
            .bind(short_key)
            .bind(original_url)
            .bind(expiry)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            Ok::<_, sqlx::Error>(result.rows_affected() == 1)
        })
        .await
        .inspect_err(|e| error!("Failed to insert mapping {}: {}", short_key, e))?;

        debug!("INSERT {} -> inserted={}", short_key, inserted);
        Ok(inserted)
    }

    async fn lookup(&self, short_key: &str) -> StorageResult<Option<UrlMapping>> {
        let row = with_deadline(
            STORE,
            self.timeout,
            sqlx::query_as::<_, MappingRow>(
                r#"
                SELECT short_key, original_url, expiry
                FROM url_mappings
                WHERE short_key = $1
                "#,
            )
            .bind(short_key)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.map(UrlMapping::from))
    }

    async fn delete(&self, short_key: &str) -> StorageResult<()> {
        let result = with_deadline(
            STORE,
            self.timeout,
            sqlx::query("DELETE FROM url_mappings WHERE short_key = $1")
                .bind(short_key)
                .execute(self.pool.as_ref()),
        )
        .await?;

        debug!("DELETE {} ({} rows)", short_key, result.rows_affected());
        Ok(())
    }

    async fn delete_expired(&self, short_key: &str, expiry: i64) -> StorageResult<bool> {
        let result = with_deadline(
            STORE,
            self.timeout,
            sqlx::query("DELETE FROM url_mappings WHERE short_key = $1 AND expiry = $2")
                .bind(short_key)
                .bind(expiry)
                .execute(self.pool.as_ref()),
        )
        .await?;

        debug!("DELETE expired {} ({} rows)", short_key, result.rows_affected());
        Ok(result.rows_affected() == 1)
    }

    async fn health_check(&self) -> bool {
        with_deadline(
            STORE,
            self.timeout,
            sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(self.pool.as_ref()),
        )
        .await
        .is_ok()
    }
}
