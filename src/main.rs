use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use listing_watcher::{logging, AppConfig, Scanner};

/// Poll marketplace searches once and notify about newly listed items.
#[derive(Debug, Parser)]
#[command(name = "listing-watcher", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/watcher.toml")]
    config: PathBuf,

    /// Override the file that stores already-notified item ids
    #[arg(long)]
    items_file: Option<PathBuf>,

    /// Override the configured log level (e.g. "debug")
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    if let Some(items_file) = cli.items_file {
        config.storage.items_file = items_file;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    let guard = logging::init(&config.logging)?;

    info!(queries = config.queries.len(), "Starting Listing Watcher...");

    let mut scanner = Scanner::from_config(&config)
        .inspect_err(|e| error!(error = %e, "Failed to set up scanner"))?;
    match scanner.run().await {
        Ok(summary) => {
            info!(new_items = summary.items_new, "Shutting down...");
            Ok(())
        }
        Err(_) => {
            // Scanner::run has already logged the cause
            drop(guard);
            std::process::exit(1);
        }
    }
}
