//! Ingestion cycle orchestration.
//!
//! One cycle walks every configured source and runs it through:
//!
//! 1. **Discovery**: feed adapter or headline pattern matcher, by source kind
//! 2. **Dedup**: skip any candidate whose link is already stored
//! 3. **Enrichment**: body excerpt and image, fetched independently and
//!    concurrently, only for candidates that survived dedup
//! 4. **Persist**: insert-if-absent into the store
//!
//! Feed sources run first, then pattern-matched sources. Within each phase up
//! to `source_concurrency` sources are processed at once. Every source ends
//! in its own [`SourceOutcome`]; a failing source never stops the others.

use crate::fetch::PageFetcher;
use crate::models::{Candidate, SourceDescriptor, SourceKind};
use crate::scrapers::{body, feed, headlines, image};
use crate::store::NewsStore;
use crate::utils::BoxError;
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};

/// Counts for one source that completed its cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Candidates produced by discovery.
    pub discovered: usize,
    /// Candidates enriched and newly stored.
    pub saved: usize,
    /// Candidates whose link was already stored.
    pub skipped: usize,
}

/// How one source's share of a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Completed(SourceStats),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub kind: SourceKind,
    pub outcome: SourceOutcome,
}

/// Aggregated result of one cycle, one entry per source in processing order.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub sources: Vec<SourceReport>,
    pub elapsed: Duration,
}

impl CycleReport {
    fn completed(&self) -> impl Iterator<Item = &SourceStats> {
        self.sources.iter().filter_map(|s| match &s.outcome {
            SourceOutcome::Completed(stats) => Some(stats),
            SourceOutcome::Failed { .. } => None,
        })
    }

    pub fn discovered(&self) -> usize {
        self.completed().map(|s| s.discovered).sum()
    }

    pub fn saved(&self) -> usize {
        self.completed().map(|s| s.saved).sum()
    }

    pub fn skipped(&self) -> usize {
        self.completed().map(|s| s.skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.sources.len() - self.completed().count()
    }
}

/// Drives ingestion cycles over a fetcher and a store.
#[derive(Debug)]
pub struct Ingestor<'a, F, S> {
    fetcher: &'a F,
    store: &'a S,
    source_concurrency: usize,
}

impl<'a, F, S> Ingestor<'a, F, S>
where
    F: PageFetcher,
    S: NewsStore,
{
    pub fn new(fetcher: &'a F, store: &'a S, source_concurrency: usize) -> Self {
        Self {
            fetcher,
            store,
            source_concurrency: source_concurrency.max(1),
        }
    }

    /// Run one full cycle over `sources`.
    ///
    /// Feed sources are processed before pattern-matched ones. The returned
    /// report lists sources in that processing order.
    #[instrument(level = "info", skip_all, fields(sources = sources.len()))]
    pub async fn run_cycle(&self, sources: &[SourceDescriptor]) -> CycleReport {
        let t0 = Instant::now();
        info!("Starting ingestion cycle");

        let mut report = CycleReport::default();
        for kind in [SourceKind::Feed, SourceKind::Pattern] {
            let phase: Vec<SourceReport> = stream::iter(sources.iter().filter(|s| s.kind == kind))
                .map(move |source| async move {
                    let outcome = match self.ingest_source(source).await {
                        Ok(stats) => SourceOutcome::Completed(stats),
                        Err(e) => {
                            error!(source = %source.name, error = %e, "Source failed; continuing with remaining sources");
                            SourceOutcome::Failed {
                                error: e.to_string(),
                            }
                        }
                    };
                    SourceReport {
                        name: source.name.clone(),
                        kind: source.kind,
                        outcome,
                    }
                })
                .buffered(self.source_concurrency)
                .collect()
                .await;
            report.sources.extend(phase);
        }
        report.elapsed = t0.elapsed();

        info!(
            sources = report.sources.len(),
            discovered = report.discovered(),
            saved = report.saved(),
            skipped = report.skipped(),
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Cycle complete"
        );
        report
    }

    /// Discover, dedup, enrich and persist the candidates of one source.
    ///
    /// # Errors
    ///
    /// Only storage errors escape; fetch and parse failures have already been
    /// turned into empty results by the adapters.
    #[instrument(level = "info", skip_all, fields(source = %source.name, kind = ?source.kind))]
    async fn ingest_source(&self, source: &SourceDescriptor) -> Result<SourceStats, BoxError> {
        let candidates = self.discover(source).await;
        let mut stats = SourceStats {
            discovered: candidates.len(),
            ..Default::default()
        };

        for mut candidate in candidates {
            // Dedup before enrichment so known links never cost a fetch.
            if self.store.exists_by_link(&candidate.link).await? {
                stats.skipped += 1;
                continue;
            }

            self.enrich(&mut candidate).await;
            candidate.source = source.name.clone();

            let title = candidate.title.clone();
            if self.store.save(candidate).await? {
                stats.saved += 1;
                debug!(%title, "Saved");
            } else {
                // Another worker stored the same link after our existence check.
                stats.skipped += 1;
            }
        }

        if stats.saved > 0 {
            info!(saved = stats.saved, skipped = stats.skipped, "Added articles");
        }
        Ok(stats)
    }

    async fn discover(&self, source: &SourceDescriptor) -> Vec<Candidate> {
        match source.kind {
            SourceKind::Feed => feed::fetch_feed(self.fetcher, &source.url).await,
            SourceKind::Pattern => {
                headlines::scrape_homepage(self.fetcher, &source.url, &source.name).await
            }
        }
    }

    /// Fill in body and image. Each resolves on its own fetch so one failing
    /// never blocks the other.
    async fn enrich(&self, candidate: &mut Candidate) {
        let (body, image) = futures::join!(
            body::fetch_body(self.fetcher, &candidate.link),
            image::fetch_image(self.fetcher, &candidate.link),
        );
        candidate.body = body;
        candidate.image_url = image;
    }
}
