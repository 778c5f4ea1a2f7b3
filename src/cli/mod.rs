//! CLI module for semcache
//!
//! Maintenance subcommands for persistent semantic caches:
//! - `stats`: partitions and row counts of a SQLite cache file
//! - `prune`: delete expired rows from a SQLite cache file
//! - `lookup`: run one lookup through the configured cache

pub mod lookup;
pub mod prune;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::vector_store::{SqliteStoreConfig, VectorStoreConfig};
use crate::infrastructure::logging;

/// semcache - Semantic result cache maintenance
#[derive(Parser)]
#[command(name = "semcache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over config/default and config/local
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show partitions and row counts of a SQLite cache
    Stats(stats::StatsArgs),

    /// Delete expired rows from a SQLite cache
    Prune(prune::PruneArgs),

    /// Look up a text in a partition of the configured cache
    Lookup(lookup::LookupArgs),
}

/// Load configuration and install logging
pub fn bootstrap(config_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = match config_path {
        Some(path) => AppConfig::load_with_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_default(),
    };

    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    Ok(config)
}

/// SQLite settings for maintenance commands: explicit path or configured store
///
/// Background and opportunistic pruning are disabled so commands only do
/// what they are asked.
pub(crate) fn sqlite_target(
    path: Option<PathBuf>,
    config: &AppConfig,
) -> anyhow::Result<SqliteStoreConfig> {
    let base = match (path, &config.semantic_cache.store) {
        (Some(path), VectorStoreConfig::Sqlite(configured)) => SqliteStoreConfig {
            path,
            ..configured.clone()
        },
        (Some(path), _) => SqliteStoreConfig::new(path),
        (None, VectorStoreConfig::Sqlite(configured)) => configured.clone(),
        (None, _) => anyhow::bail!("No --path given and the configured store is not sqlite"),
    };

    Ok(base
        .with_prune_interval(std::time::Duration::ZERO)
        .with_prune_probability(0.0))
}
