//! Short key creation, redirect resolution and hit statistics.

use std::sync::Arc;

use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, error, info, warn};

use crate::domain::repositories::{CounterStore, MappingStore, StorageError};
use crate::utils::clock::SharedClock;
use crate::utils::key_generator::{KeyGenerator, is_well_formed};
use crate::utils::url_normalizer::{UrlValidationError, ensure_scheme, validate_url};

/// Collision retries before giving up on a create request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Errors surfaced by [`ShortenerService`].
#[derive(Debug, thiserror::Error)]
pub enum ShortenerError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),

    #[error("no free short key after {attempts} attempts")]
    KeyspaceExhausted { attempts: u32 },

    #[error("short key not found")]
    NotFound,

    #[error("short key expired")]
    Expired,

    #[error(transparent)]
    StorageUnavailable(#[from] StorageError),
}

/// Outcome of resolving a short key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Live mapping; `target` always carries a scheme.
    Found { target: String },
    /// The mapping was past its expiry and has been reaped.
    Expired,
    NotFound,
}

/// Reachability of both backing stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHealth {
    pub mapping_store: bool,
    pub counter_store: bool,
}

impl StoreHealth {
    pub fn is_healthy(&self) -> bool {
        self.mapping_store && self.counter_store
    }
}

/// Orchestrates the mapping store and the counter store.
///
/// The two stores never share a transaction. The mapping store is authoritative
/// for existence and expiry; the counter store is best-effort, so its failures
/// during create and redirect are logged and swallowed while mapping store
/// failures always propagate.
pub struct ShortenerService<M: MappingStore + ?Sized, C: CounterStore + ?Sized> {
    mappings: Arc<M>,
    counters: Arc<C>,
    keys: KeyGenerator,
    clock: SharedClock,
    max_attempts: u32,
}

/// Service over type-erased stores, as held by the HTTP layer.
pub type DynShortenerService = ShortenerService<dyn MappingStore, dyn CounterStore>;

impl<M: MappingStore + ?Sized, C: CounterStore + ?Sized> ShortenerService<M, C> {
    pub fn new(mappings: Arc<M>, counters: Arc<C>, keys: KeyGenerator, clock: SharedClock) -> Self {
        Self {
            mappings,
            counters,
            keys,
            clock,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the collision retry cap. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Creates a mapping for `url` and returns its short key.
    ///
    /// `expiry` is a lifetime in seconds; `None` or `Some(0)` means the mapping
    /// never expires.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::InvalidUrl`] if `url` lacks an http(s) scheme or a host;
    ///   nothing is written
    /// - [`ShortenerError::KeyspaceExhausted`] if every candidate key was taken
    /// - [`ShortenerError::StorageUnavailable`] if the mapping store failed
    pub async fn shorten(&self, url: &str, expiry: Option<u64>) -> Result<String, ShortenerError> {
        validate_url(url)?;

        let expiry = expiry.filter(|&seconds| seconds > 0);
        let issued_at = self.clock.unix_now();
        let expires_at = expiry.map(|seconds| issued_at.saturating_add_unsigned(seconds));

        let mut short_key = None;
        for attempt in 0..self.max_attempts {
            let candidate = if attempt == 0 {
                self.keys.generate(url, expiry, issued_at)
            } else {
                self.keys
                    .generate_salted(url, expiry, issued_at, rand::random::<u64>())
            };

            if self
                .mappings
                .insert_if_absent(&candidate, url, expires_at)
                .await?
            {
                short_key = Some(candidate);
                break;
            }

            metrics::counter!("shortener_key_collisions_total").increment(1);
            warn!("Short key collision on {} (attempt {})", candidate, attempt + 1);
        }

        let Some(short_key) = short_key else {
            error!(
                "Keyspace exhausted for {} after {} attempts",
                url, self.max_attempts
            );
            return Err(ShortenerError::KeyspaceExhausted {
                attempts: self.max_attempts,
            });
        };

        self.init_counter(&short_key, expiry).await;

        metrics::counter!("shortener_links_created_total").increment(1);
        info!("Created {} -> {}", short_key, url);

        Ok(short_key)
    }

    /// Resolves a short key for redirecting.
    ///
    /// An expired mapping is lazily deleted from both stores before
    /// [`RedirectTarget::Expired`] is returned; cleanup failures do not change
    /// the outcome. A live hit increments the counter on a best-effort basis.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::StorageUnavailable`] if the mapping lookup failed.
    pub async fn resolve(&self, short_key: &str) -> Result<RedirectTarget, ShortenerError> {
        if !is_well_formed(short_key) {
            return Ok(RedirectTarget::NotFound);
        }

        let Some(mapping) = self.mappings.lookup(short_key).await? else {
            return Ok(RedirectTarget::NotFound);
        };

        if let Some(expiry) = mapping
            .expiry
            .filter(|_| mapping.is_expired_at(self.clock.unix_now()))
        {
            metrics::counter!("shortener_expired_total").increment(1);
            info!("Mapping {} expired, reaping", short_key);

            let reap_counter = match self.mappings.delete_expired(short_key, expiry).await {
                Ok(deleted) => {
                    if !deleted {
                        debug!("Mapping {} was replaced before reaping", short_key);
                    }
                    deleted
                }
                Err(e) => {
                    warn!("Failed to delete expired mapping {}: {}", short_key, e);
                    true
                }
            };

            if reap_counter {
                if let Err(e) = self.counters.delete(short_key).await {
                    warn!("Failed to delete counter for {}: {}", short_key, e);
                }
            }

            return Ok(RedirectTarget::Expired);
        }

        match self.counters.increment(short_key).await {
            Ok(hits) => debug!("{} hit #{}", short_key, hits),
            Err(e) => {
                metrics::counter!("shortener_counter_failures_total").increment(1);
                warn!("Failed to count hit for {}: {}", short_key, e);
            }
        }

        metrics::counter!("shortener_redirects_total").increment(1);

        Ok(RedirectTarget::Found {
            target: ensure_scheme(&mapping.original_url).into_owned(),
        })
    }

    /// Returns the hit count for a short key.
    ///
    /// A missing counter falls back to the mapping store: if the mapping still
    /// exists (even expired but not yet reaped) the count is 0.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::NotFound`] if neither store knows the key
    /// - [`ShortenerError::StorageUnavailable`] if either store failed
    pub async fn stats(&self, short_key: &str) -> Result<i64, ShortenerError> {
        if !is_well_formed(short_key) {
            return Err(ShortenerError::NotFound);
        }

        if let Some(hits) = self.counters.get(short_key).await? {
            return Ok(hits);
        }

        match self.mappings.lookup(short_key).await? {
            Some(_) => Ok(0),
            None => Err(ShortenerError::NotFound),
        }
    }

    pub async fn health(&self) -> StoreHealth {
        let (mapping_store, counter_store) =
            tokio::join!(self.mappings.health_check(), self.counters.health_check());

        StoreHealth {
            mapping_store,
            counter_store,
        }
    }

    /// Starts the hit counter at 0, retrying twice with backoff.
    ///
    /// If every attempt fails the mapping stays without a counter: stats report 0
    /// until the first redirect re-creates the counter at 1.
    async fn init_counter(&self, short_key: &str, ttl_seconds: Option<u64>) {
        let strategy = ExponentialBackoff::from_millis(10).take(2);

        let result = Retry::start(strategy, || self.counters.init(short_key, ttl_seconds)).await;

        if let Err(e) = result {
            metrics::counter!("shortener_counter_failures_total").increment(1);
            error!("Failed to initialize counter for {}: {}", short_key, e);
        }
    }
}
