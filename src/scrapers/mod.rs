//! Extraction cascades for turning fetched documents into news items.
//!
//! Each submodule owns one stage of the pipeline and follows the same shape:
//! a pure function that works on an already-fetched document (easy to test
//! against synthetic markup) plus an async wrapper that fetches through a
//! [`PageFetcher`](crate::fetch::PageFetcher) and converts every failure into
//! an empty or sentinel value.
//!
//! # Stages
//!
//! | Stage | Module | Input | Output |
//! |-------|--------|-------|--------|
//! | Structured feed adapter | [`feed`] | RSS/Atom URL | `Vec<Candidate>` |
//! | Headline pattern matcher | [`headlines`] | Homepage URL | `Vec<Candidate>` |
//! | Body extractor | [`body`] | Article URL | excerpt or sentinel |
//! | Image resolver | [`image`] | Article URL | `Option<String>` |
//!
//! # Cascades
//!
//! The headline, body and image stages are ordered lists of selector tiers
//! kept as static data and evaluated first-match-wins. Adding a tier for a
//! new site layout means adding one entry to the list.

pub mod body;
pub mod feed;
pub mod headlines;
pub mod image;

use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Selector};

/// Compile a selector that is part of a static cascade.
///
/// Cascade selectors are string constants covered by the unit tests, so a
/// parse failure here is a programming error rather than a runtime condition.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid cascade selector {css:?}: {e:?}"))
}

/// Visible text of an element with whitespace collapsed and trimmed.
///
/// Text nodes are concatenated as-is; inline markup such as `<em>` or `<a>`
/// must not introduce spaces the page does not show.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}
