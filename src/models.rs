//! Data models for discovered news items and their ingestion sources.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`Candidate`]: One discovered article, before and after enrichment
//! - [`NewsSnapshot`]: Newest-first listing of everything stored
//! - [`SourceDescriptor`]: Static description of one content origin
//! - [`SourceKind`]: Whether a source is a structured feed or a homepage
//!   that has to be pattern-matched
//!
//! Candidates serialize with camelCase field names so the JSON snapshot
//! matches the shape clients of the news listing already expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single news item as discovered by a feed adapter or the headline matcher.
///
/// A candidate starts out **unenriched** (`body` empty, `image_url` unset).
/// Only candidates whose `link` is not yet stored get enriched and saved;
/// the pipeline never updates an item once it has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Display headline. Never empty.
    pub title: String,
    /// Absolute article URL. This is the deduplication key and is never
    /// changed after the candidate is created.
    pub link: String,
    /// Publish time taken from the feed, or discovery time for scraped
    /// headlines. Absent when a feed omits it.
    pub published_at: Option<DateTime<Utc>>,
    /// Human-readable origin label.
    pub source: String,
    /// Plain-text excerpt, filled in by enrichment.
    #[serde(default)]
    pub body: String,
    /// Representative image, if any tier of the image cascade found one.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Candidate {
    /// Create an unenriched candidate.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at,
            source: source.into(),
            body: String::new(),
            image_url: None,
        }
    }
}

/// The newest-first listing of every stored item, as written after each cycle.
///
/// This is the read-only view consumed by whatever serves news to clients;
/// it is also read back at startup to seed the store.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSnapshot {
    /// When the snapshot was written.
    pub generated_at: DateTime<Utc>,
    /// Stored items, newest publish time first.
    pub items: Vec<Candidate>,
}

/// How a source is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// RSS or Atom document, parsed by the feed adapter.
    Feed,
    /// Arbitrary HTML homepage, run through the headline pattern cascade.
    #[serde(alias = "pattern-matched", alias = "scrape")]
    Pattern,
}

/// Static configuration for one content origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
    pub kind: SourceKind,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind,
        }
    }
}
