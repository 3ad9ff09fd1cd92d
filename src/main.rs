//! scholar-abstracts - Google Scholar query + publisher abstract scraper
//!
//! ## Usage
//!
//! ```bash
//! scholar-abstracts "deep brain stimulation" "eeg decoding"
//! ```
//!
//! `SERP_API_KEY` and `SCRAPERAPI_API_KEY` are read from the environment or
//! a `.env` file.

use anyhow::{Context, Result};
use clap::Parser;
use scholar_abstracts::config::{self, Config, DEFAULT_DATA_DIR};
use scholar_abstracts::pipeline;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Query Google Scholar and scrape publisher abstracts for the results
#[derive(Parser)]
#[command(name = "scholar-abstracts")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Search queries, one per argument
    #[arg(required = true)]
    queries: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Directory for per-query and combined CSV files
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Environment file holding API keys
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    config::load_env_file(&cli.env_file).context("Failed to load environment file")?;
    let config = Config::from_env()
        .context("Missing API credentials")?
        .with_data_dir(cli.data_dir);

    info!(queries = ?cli.queries, data_dir = %config.data_dir.display(), "Starting run");

    let summary = pipeline::run(&config, &cli.queries)
        .await
        .context("Run failed")?;

    println!("{}", summary);
    Ok(())
}
