//! # Hybrid News Ingest
//!
//! A background ingestion service that collects news from structured feeds
//! and from arbitrary HTML homepages, deduplicates against everything seen
//! before, and enriches each new item with a body excerpt and an image.
//!
//! ## Usage
//!
//! ```sh
//! hybrid_news_ingest -j ./public -c config.yaml
//! ```
//!
//! ## Architecture
//!
//! Every cycle follows the same pipeline:
//! 1. **Discovery**: parse feeds, pattern-match headline lists on homepages
//! 2. **Dedup**: drop candidates whose link is already stored
//! 3. **Enrichment**: fetch body text and representative image for new items
//! 4. **Persist**: insert into the store and write the `news.json` snapshot
//!
//! Cycles repeat on a fixed interval until interrupted (or once with `--once`).

use clap::Parser;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod fetch;
mod ingest;
mod models;
mod outputs;
mod scrapers;
mod store;
mod utils;

use cli::Cli;
use config::AppConfig;
use fetch::HttpFetcher;
use ingest::{Ingestor, SourceOutcome};
use outputs::json;
use store::{MemoryStore, NewsStore};
use utils::{BoxError, ensure_writable_dir};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), BoxError> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("news ingest starting up");

    let args = Cli::parse();
    debug!(?args.json_output_dir, ?args.config, "Parsed CLI arguments");

    let mut config: AppConfig = config::load_config(args.config.as_deref())?;
    if let Some(secs) = args.interval_secs {
        config.interval_secs = secs;
        config.validate()?;
    }

    // Early check: ensure JSON output dir is writable
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // Seed dedup state from the last snapshot so a restart does not re-ingest.
    let store = MemoryStore::from_items(json::read_snapshot(&args.json_output_dir).await?);
    info!(stored = store.len().await, "Store ready");

    let fetcher = HttpFetcher::new()?;
    let ingestor = Ingestor::new(&fetcher, &store, config.source_concurrency);

    if args.once {
        run_and_publish(&ingestor, &store, &config, &args.json_output_dir).await;
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = config.interval_secs, "Scheduler started");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Could not listen for Ctrl-C; stopping");
        }
    };
    run_until_shutdown(ticker, shutdown, || {
        run_and_publish(&ingestor, &store, &config, &args.json_output_dir)
    })
    .await;

    info!("news ingest stopped");
    Ok(())
}

/// Run `cycle` on every tick until `shutdown` resolves.
///
/// The shutdown future is polled for the whole loop, so a signal that arrives
/// while a cycle is running abandons that cycle instead of being lost.
async fn run_until_shutdown<C, Fut>(
    mut ticker: Interval,
    shutdown: impl Future<Output = ()>,
    mut cycle: C,
) where
    C: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                return;
            }
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = &mut shutdown => {
                warn!("Shutdown requested mid-cycle; abandoning current cycle");
                return;
            }
            _ = cycle() => {}
        }
    }
}

/// Run one cycle and, if anything new was stored, rewrite the snapshot.
#[instrument(level = "info", skip_all)]
async fn run_and_publish(
    ingestor: &Ingestor<'_, HttpFetcher, MemoryStore>,
    store: &MemoryStore,
    config: &AppConfig,
    json_output_dir: &str,
) {
    let report = ingestor.run_cycle(&config.sources).await;
    for source in &report.sources {
        match &source.outcome {
            SourceOutcome::Completed(stats) => debug!(
                source = %source.name,
                kind = ?source.kind,
                discovered = stats.discovered,
                saved = stats.saved,
                skipped = stats.skipped,
                "Source completed"
            ),
            SourceOutcome::Failed { error } => {
                warn!(source = %source.name, kind = ?source.kind, %error, "Source failed this cycle")
            }
        }
    }

    if report.saved() == 0 && json::snapshot_exists(json_output_dir) {
        return;
    }

    match store.find_all_newest_first().await {
        Ok(items) => {
            if let Err(e) = json::write_snapshot(items, json_output_dir).await {
                error!(error = %e, "Failed to write news snapshot");
            }
        }
        Err(e) => warn!(error = %e, "Could not list stored items; snapshot not updated"),
    }
}
