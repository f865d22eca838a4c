//! Errors raised by store implementations.

use std::time::Duration;

/// A backing store could not serve the request.
///
/// Never used to signal absence: a missing key is `Ok(None)` / `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{store} unavailable: {reason}")]
    Unavailable { store: &'static str, reason: String },

    #[error("{store} did not respond within {timeout:?}")]
    Timeout {
        store: &'static str,
        timeout: Duration,
    },
}

impl StorageError {
    pub fn unavailable(store: &'static str, reason: impl ToString) -> Self {
        Self::Unavailable {
            store,
            reason: reason.to_string(),
        }
    }

    /// Name of the store that failed.
    pub fn store(&self) -> &'static str {
        match self {
            Self::Unavailable { store, .. } | Self::Timeout { store, .. } => store,
        }
    }
}

/// Result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Runs a store operation under a deadline, mapping both elapsed deadlines and
/// driver errors into [`StorageError`].
pub async fn with_deadline<T, E, F>(
    store: &'static str,
    timeout: Duration,
    operation: F,
) -> StorageResult<T>
where
    E: std::fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(StorageError::unavailable(store, e)),
        Err(_) => Err(StorageError::Timeout { store, timeout }),
    }
}
