use clap::Parser;
use semcache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::bootstrap(cli.config.as_deref())?;

    match cli.command {
        Command::Stats(args) => cli::stats::run(args, &config).await,
        Command::Prune(args) => cli::prune::run(args, &config).await,
        Command::Lookup(args) => cli::lookup::run(args, &config).await,
    }
}
