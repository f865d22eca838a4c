//! CLI administration tool for shortkey.
//!
//! Inspects mappings and counters, sweeps expired mappings, and checks store
//! connectivity without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a mapping and its hit counter (does not count as a hit)
//! cargo run --bin admin -- inspect 0ALdg8GD
//!
//! # Mapping totals
//! cargo run --bin admin -- stats
//!
//! # Delete every expired mapping
//! cargo run --bin admin -- purge
//!
//! # Check store connections
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Reads the same configuration as the server (see [`shortkey::config`]), so
//! `SECRET_KEY` must be set and Redis may be given as `REDIS_URL` or
//! `REDIS_HOST`/`REDIS_PORT`.

use shortkey::config::{self, Config};
use shortkey::domain::repositories::{CounterStore, MappingStore};
use shortkey::infrastructure::cache::RedisCounterStore;
use shortkey::infrastructure::persistence::PgMappingStore;
use shortkey::utils::clock::{Clock, SystemClock};
use shortkey::utils::key_generator::is_well_formed;

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortkey.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the mapping and hit counter behind a short key
    Inspect {
        /// Eight-character short key
        short_key: String,
    },

    /// Show mapping totals
    Stats,

    /// Delete expired mappings that no redirect has reaped yet
    Purge {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Store connectivity
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check PostgreSQL (and Redis, if configured)
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let mappings = PgMappingStore::new(
        Arc::new(pool.clone()),
        Arc::new(SystemClock),
        config.store_timeout(),
    );

    match cli.command {
        Commands::Inspect { short_key } => inspect(&mappings, &short_key, &config).await?,
        Commands::Stats => handle_stats(&mappings).await?,
        Commands::Purge { yes } => purge(&mappings, yes).await?,
        Commands::Db { action } => handle_db_action(action, &pool, &config).await?,
    }

    Ok(())
}

/// Connects to Redis if the configuration names one.
async fn connect_counters(config: &Config) -> Result<Option<RedisCounterStore>> {
    let Some(redis_url) = config.redis_url.as_deref() else {
        return Ok(None);
    };

    let store = RedisCounterStore::connect(redis_url, config.store_timeout())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?;

    Ok(Some(store))
}

/// Prints a mapping, its expiry state and its counter.
///
/// Reads only: an expired mapping is reported, not reaped.
async fn inspect(mappings: &PgMappingStore, short_key: &str, config: &Config) -> Result<()> {
    println!("{}", "🔎 Inspect short key".bright_blue().bold());
    println!();

    if !is_well_formed(short_key) {
        anyhow::bail!("'{}' is not an 8-character base-62 key", short_key);
    }

    let mapping = mappings
        .lookup(short_key)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let Some(mapping) = mapping else {
        println!("{}", "  No mapping found".yellow());
        return Ok(());
    };

    let now = SystemClock.unix_now();

    println!("  Key:     {}", mapping.short_key.cyan());
    println!("  URL:     {}", mapping.original_url.bright_white());

    match mapping.expiry {
        None => println!("  Expiry:  {}", "never".bright_black()),
        Some(expiry) => {
            let at = DateTime::from_timestamp(expiry, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| expiry.to_string());

            let state = if mapping.is_expired_at(now) {
                "EXPIRED".red()
            } else {
                format!("{}s left", mapping.remaining_ttl(now).unwrap_or(0)).green()
            };

            println!("  Expiry:  {} ({})", at.bright_black(), state);
        }
    }

    match connect_counters(config).await? {
        Some(counters) => {
            let hits = counters
                .get(short_key)
                .await
                .map_err(|e| anyhow::anyhow!("Redis error: {}", e))?;

            match hits {
                Some(hits) => println!("  Hits:    {}", hits.to_string().bright_green().bold()),
                None => println!("  Hits:    {}", "no counter (reports 0)".bright_black()),
            }
        }
        None => println!("  Hits:    {}", "Redis not configured".bright_black()),
    }

    println!();
    Ok(())
}

/// Displays mapping totals.
async fn handle_stats(mappings: &PgMappingStore) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let summary = mappings
        .summary()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!(
        "  Mappings:          {}",
        summary.total.to_string().bright_green().bold()
    );
    println!(
        "  With expiry:       {}",
        summary.expiring.to_string().bright_green().bold()
    );
    println!(
        "  Expired, unreaped: {}",
        summary.expired.to_string().yellow().bold()
    );
    println!();

    Ok(())
}

/// Sweeps expired mappings after confirmation.
///
/// Counters are left to their own TTL in Redis.
async fn purge(mappings: &PgMappingStore, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Purge expired mappings".bright_blue().bold());
    println!();

    let summary = mappings
        .summary()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    if summary.expired == 0 {
        println!("{}", "  Nothing to purge".green());
        return Ok(());
    }

    println!(
        "  {} expired mappings will be deleted",
        summary.expired.to_string().yellow().bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete them?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = mappings
        .purge_expired()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to purge: {}", e))?;

    println!();
    println!(
        "{}",
        format!("✅ Deleted {} mappings", deleted).green().bold()
    );
    println!();

    Ok(())
}

/// Handles connectivity diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking store connections...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;
            println!("{}", "✅ PostgreSQL connection OK".green().bold());

            match connect_counters(config).await? {
                Some(counters) if counters.health_check().await => {
                    println!("{}", "✅ Redis connection OK".green().bold());
                }
                Some(_) => anyhow::bail!("Redis PING failed"),
                None => println!("{}", "  Redis not configured".bright_black()),
            }
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
