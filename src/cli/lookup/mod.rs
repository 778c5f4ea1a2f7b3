//! Lookup command - runs one semantic cache lookup using the configuration

use anyhow::Context;
use clap::Args;

use crate::config::AppConfig;
use crate::infrastructure::services::SemanticCacheRegistry;

/// Arguments for the lookup command
#[derive(Args, Clone)]
pub struct LookupArgs {
    /// Partition key, e.g. a tool name
    #[arg(long)]
    pub partition: String,

    /// Input text to embed and search for
    #[arg(long)]
    pub text: String,
}

/// Run the lookup command
pub async fn run(args: LookupArgs, config: &AppConfig) -> anyhow::Result<()> {
    let registry = SemanticCacheRegistry::new();

    let cache = registry
        .get_or_create("cli", &config.semantic_cache)
        .await?
        .context("Semantic cache is disabled in the configuration")?;

    let lookup = cache.get(&args.partition, &args.text).await;
    registry.close_all().await?;
    let lookup = lookup?;

    let score = lookup
        .best_score()
        .map_or_else(|| "-".to_string(), |s| format!("{:.4}", s));

    if let Some(result) = lookup.result() {
        println!("hit (score {}, threshold {})", score, cache.threshold());
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("miss (best score {}, threshold {})", score, cache.threshold());
    }

    Ok(())
}
