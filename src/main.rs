//! Canopy CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canopy::commands;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Incremental architecture documentation builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Repository root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full Discover -> Analyze -> Files -> Directories ->
    /// Architecture -> Commit pipeline once and exit.
    Build {
        /// Override the configured wiki output directory.
        #[arg(long)]
        wiki_dir: Option<String>,

        /// Force the bundled offline text generator (the only one available).
        #[arg(long)]
        offline: bool,
    },
    /// Run Discover + Analyze only and print graph statistics.
    Index,
    /// Remove the signature cache and graph cache. Does not touch the wiki.
    Clear,
    /// Validate the existing wiki against the current source tree and report
    /// staleness without writing anything.
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("canopy={log_level}")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("canopy v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("repository root: {}", cli.root.display());

    match cli.command {
        Commands::Build { wiki_dir, offline } => commands::build(cli.root, wiki_dir, offline).await,
        Commands::Index => commands::index(cli.root).await,
        Commands::Clear => commands::clear(cli.root),
        Commands::Doctor => commands::doctor(cli.root).await,
    }
}
