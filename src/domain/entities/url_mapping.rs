//! URL mapping entity: the durable record behind a short key.

/// The authoritative mapping from a short key to its original URL.
///
/// `expiry` is an absolute Unix timestamp in seconds. Once the current time is
/// strictly past it the record is logically dead, even if it has not been reaped yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub short_key: String,
    pub original_url: String,
    pub expiry: Option<i64>,
}

impl UrlMapping {
    pub fn new(
        short_key: impl Into<String>,
        original_url: impl Into<String>,
        expiry: Option<i64>,
    ) -> Self {
        Self {
            short_key: short_key.into(),
            original_url: original_url.into(),
            expiry,
        }
    }

    /// Returns true if the mapping is past its expiry at `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiry.is_some_and(|expiry| now > expiry)
    }

    /// Seconds left before expiry, or `None` for mappings that never expire.
    pub fn remaining_ttl(&self, now: i64) -> Option<i64> {
        self.expiry.map(|expiry| (expiry - now).max(0))
    }
}
