//! Command-line interface definitions for the news ingestor.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The config path can also come from the environment.

use clap::Parser;

/// Command-line arguments for the news ingestor.
///
/// # Examples
///
/// ```sh
/// # Built-in sources, new cycle every 60 seconds
/// hybrid_news_ingest -j ./public
///
/// # Custom source list, single cycle
/// hybrid_news_ingest -j ./public -c config.yaml --once
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the news.json snapshot
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Optional path to config.yaml file
    #[arg(short, long, env = "NEWS_CONFIG")]
    pub config: Option<String>,

    /// Seconds between cycles (overrides the config file)
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}
