//! Page-Indexer main entry point
//!
//! This is the command-line interface for the Page-Indexer crawl service.

use anyhow::Context;
use clap::Parser;
use page_indexer::config::{load_config_with_hash, LogLevel};
use page_indexer::crawler::crawl;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Page-Indexer: crawls from seed URLs and feeds a search index
///
/// Runs crawl passes back to back until interrupted with Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "page-indexer")]
#[command(version)]
#[command(about = "Crawls from seed URLs and feeds a search index", long_about = None)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            setup_logging(LogLevel::default());
            tracing::error!(
                "Failed to load configuration from {}: {}",
                cli.config.display(),
                e
            );
            return Err(e)
                .with_context(|| format!("invalid configuration: {}", cli.config.display()));
        }
    };

    setup_logging(config.log_level);
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );
    tracing::info!(
        seeds = config.url_list.len(),
        concurrency = config.number_of_concurrent_tasks,
        max_depth = config.maximum_search_depth,
        index = %config.elastic.index_name,
        "Starting crawler"
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    if let Err(e) = crawl(config, cancel).await {
        tracing::error!("Crawler failed to start: {}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn setup_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("page_indexer={},warn", level.as_filter())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels the crawler on the first Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, finishing current wave");
                cancel.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}
