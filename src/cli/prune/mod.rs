//! Prune command - deletes expired rows from a SQLite cache

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::VectorStore;
use crate::infrastructure::vector_store::SqliteVectorStore;

/// Arguments for the prune command
#[derive(Args, Clone)]
pub struct PruneArgs {
    /// SQLite cache file (defaults to the configured sqlite store)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Run the prune command
pub async fn run(args: PruneArgs, config: &AppConfig) -> anyhow::Result<()> {
    let target = super::sqlite_target(args.path, config)?;
    let store =
        SqliteVectorStore::open(&target, config.semantic_cache.effective_max_entries()).await?;

    let deleted = store.prune_durable().await?;
    let remaining = store.durable_row_count().await?;
    store.close().await?;

    info!(deleted, remaining, "Pruned expired cache rows");
    println!("deleted {} expired rows, {} remaining", deleted, remaining);

    Ok(())
}
