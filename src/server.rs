//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, counter store selection, service wiring, and
//! the Axum server lifecycle.

use crate::application::services::{DynShortenerService, ShortenerService};
use crate::config::Config;
use crate::domain::repositories::{CounterStore, MappingStore};
use crate::infrastructure::cache::{MemoryCounterStore, RedisCounterStore};
use crate::infrastructure::persistence::PgMappingStore;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::clock::{SharedClock, SystemClock};
use crate::utils::key_generator::KeyGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis counters (or in-memory fallback)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let clock: SharedClock = Arc::new(SystemClock);
    let timeout = config.store_timeout();

    let mappings: Arc<dyn MappingStore> = Arc::new(PgMappingStore::new(
        Arc::new(pool),
        clock.clone(),
        timeout,
    ));

    let counters: Arc<dyn CounterStore> = if let Some(redis_url) = &config.redis_url {
        match RedisCounterStore::connect(redis_url, timeout).await {
            Ok(redis) => {
                tracing::info!("Hit counters enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-memory counters.",
                    e
                );
                Arc::new(MemoryCounterStore::new(clock.clone()))
            }
        }
    } else {
        tracing::info!("Redis not configured, using in-memory counters");
        Arc::new(MemoryCounterStore::new(clock.clone()))
    };

    let shortener: Arc<DynShortenerService> = Arc::new(
        ShortenerService::new(
            mappings,
            counters,
            KeyGenerator::new(config.secret_key.as_bytes()),
            clock,
        )
        .with_max_attempts(config.key_max_attempts),
    );

    let state = AppState::new(shortener, &config.base_url);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
