//! Article body extraction.
//!
//! Pulls a short plain-text excerpt out of an article page by looking for
//! paragraphs in progressively broader regions of the document.

use crate::fetch::{ARTICLE_BODY_TIMEOUT, PageFetcher};
use crate::scrapers::{element_text, selector};
use crate::utils::truncate_chars;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

/// Longest excerpt kept, in characters, before the truncation marker.
pub const BODY_MAX_CHARS: usize = 500;

/// Appended to excerpts cut at [`BODY_MAX_CHARS`].
pub const TRUNCATION_MARKER: &str = "...";

/// Stored in place of a body when nothing could be extracted.
pub const BODY_UNAVAILABLE: &str = "Content could not be fetched. Click the link to read.";

/// Content-region cascade: known content containers, then `article`, then the whole page.
static BODY_TIERS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    vec![
        (
            "Content container paragraphs",
            selector(
                "div.article-body p, div.entry-content p, div.story-content p, div.post-content p, .article-content p",
            ),
        ),
        ("Article paragraphs", selector("article p")),
        ("All paragraphs", selector("p")),
    ]
});

/// Extract the body excerpt from an already-fetched article page.
///
/// The first tier that yields any paragraph text wins. Paragraphs are
/// joined with a single space and capped at [`BODY_MAX_CHARS`] characters.
///
/// # Returns
///
/// `None` if no tier produced any text.
pub fn extract_body(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    BODY_TIERS.iter().find_map(|(name, sel)| {
        let text = doc
            .select(sel)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            return None;
        }
        debug!(tier = *name, chars = text.chars().count(), "Body tier matched");
        Some(truncate_chars(&text, BODY_MAX_CHARS, TRUNCATION_MARKER))
    })
}

/// Fetch an article and extract its body excerpt.
///
/// # Returns
///
/// The excerpt, or [`BODY_UNAVAILABLE`] if the fetch failed or the page
/// had no paragraph text. This is a terminal value, not an error.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_body<F: PageFetcher>(fetcher: &F, url: &str) -> String {
    match fetcher.fetch_text(url, ARTICLE_BODY_TIMEOUT).await {
        Ok(html) => extract_body(&html).unwrap_or_else(|| {
            warn!("No paragraph text found");
            BODY_UNAVAILABLE.to_string()
        }),
        Err(e) => {
            warn!(error = %e, "Article fetch for body failed");
            BODY_UNAVAILABLE.to_string()
        }
    }
}
