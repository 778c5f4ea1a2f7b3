//! Stats command - reports what a SQLite cache would serve after a restart

use std::path::PathBuf;

use clap::Args;

use crate::config::AppConfig;
use crate::domain::VectorStore;
use crate::infrastructure::vector_store::SqliteVectorStore;

/// Arguments for the stats command
#[derive(Args, Clone)]
pub struct StatsArgs {
    /// SQLite cache file (defaults to the configured sqlite store)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Run the stats command
pub async fn run(args: StatsArgs, config: &AppConfig) -> anyhow::Result<()> {
    let target = super::sqlite_target(args.path, config)?;
    let store =
        SqliteVectorStore::open(&target, config.semantic_cache.effective_max_entries()).await?;

    let rows = store.durable_row_count().await?;
    let partitions = store.memory().partitions();

    println!("path: {}", store.path().display());
    println!("durable rows: {}", rows);
    println!("live partitions: {}", partitions.len());
    for (partition, live) in partitions {
        println!("  {:<48} {}", partition, live);
    }

    store.close().await?;

    Ok(())
}
