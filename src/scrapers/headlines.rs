//! Headline pattern matcher for arbitrary HTML homepages.
//!
//! Sites without a feed still present their stories as a repeated block of
//! headline markup. This module walks an ordered list of selector tiers,
//! from the most specific layouts to the most generic ones, and takes the
//! first tier that matches enough elements to look like a real headline list.
//!
//! # Tiers
//!
//! | Group | Tiers | Typical sites |
//! |-------|-------|---------------|
//! | Anchor wrapping a heading | `a:has(h1)`, `a:has(h2)`, `a:has(h3)` | Modern card layouts |
//! | CMS title classes | `.article-title a`, `.entry-title a`, `.post-title a`, `.headline a`, `.story-heading a` | WordPress and friends |
//! | Generic title containers | `div[class*='title'] a`, `div[class*='head'] a` | Custom portals |
//! | Heading containing a link | `h1 a`, `h2 a`, `h3 a` | Older templates |
//! | Bold link text | `a strong` | Last resort |
//!
//! A tier is accepted only if it matches more than [`MIN_TIER_MATCHES`]
//! elements. Fewer than that is indistinguishable from incidental markup.

use crate::fetch::{HOMEPAGE_TIMEOUT, PageFetcher};
use crate::models::Candidate;
use crate::scrapers::{element_text, selector};
use crate::utils::{resolve_url, truncate_for_log};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A tier is accepted when it matches strictly more elements than this.
pub const MIN_TIER_MATCHES: usize = 3;

/// Shortest headline (in characters) that is kept.
pub const MIN_TITLE_CHARS: usize = 15;

/// Phrases that mark navigation or boilerplate links rather than stories.
pub const GARBAGE_PHRASES: [&str; 9] = [
    "privacy policy",
    "terms of use",
    "contact us",
    "subscribe",
    "login",
    "sign in",
    "advertisement",
    "click here",
    "read more",
];

/// How a tier finds its elements.
enum Query {
    /// Plain CSS selection.
    Css(Selector),
    /// `a` elements that have a descendant matching the selector
    /// (the equivalent of `a:has(h2)`).
    AnchorWrapping(Selector),
}

/// One strategy in the headline cascade.
pub struct Tier {
    pub name: &'static str,
    query: Query,
}

impl Tier {
    fn css(name: &'static str, css: &str) -> Self {
        Self {
            name,
            query: Query::Css(selector(css)),
        }
    }

    fn anchor_wrapping(name: &'static str, inner: &str) -> Self {
        Self {
            name,
            query: Query::AnchorWrapping(selector(inner)),
        }
    }

    /// All elements this tier matches in `doc`, in document order.
    fn select<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        match &self.query {
            Query::Css(sel) => doc.select(sel).collect(),
            Query::AnchorWrapping(inner) => doc
                .select(&ANCHOR)
                .filter(|a| a.select(inner).next().is_some())
                .collect(),
        }
    }
}

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));

/// The headline cascade, highest confidence first.
pub static HEADLINE_TIERS: Lazy<Vec<Tier>> = Lazy::new(|| {
    vec![
        Tier::anchor_wrapping("Link Wrapping H1", "h1"),
        Tier::anchor_wrapping("Link Wrapping H2", "h2"),
        Tier::anchor_wrapping("Link Wrapping H3", "h3"),
        Tier::css("Article Title Class", ".article-title a"),
        Tier::css("Entry Title Class", ".entry-title a"),
        Tier::css("Post Title Class", ".post-title a"),
        Tier::css("News Headline Class", ".headline a"),
        Tier::css("Story Heading", ".story-heading a"),
        Tier::css("Generic Title Div", "div[class*='title'] a"),
        Tier::css("Generic Head Div", "div[class*='head'] a"),
        Tier::css("Standard H1", "h1 a"),
        Tier::css("Standard H2", "h2 a"),
        Tier::css("Standard H3", "h3 a"),
        Tier::css("Bold Links", "a strong"),
    ]
});

/// Result of running the cascade over one homepage.
#[derive(Debug, Default)]
pub struct HeadlineMatch {
    /// Name of the accepted tier, or `None` when no tier cleared the threshold.
    pub tier: Option<&'static str>,
    /// Number of elements the accepted tier matched, before filtering.
    pub matched: usize,
    /// Candidates that passed the validity filter.
    pub candidates: Vec<Candidate>,
}

/// Check whether a scraped title/link pair looks like a real story.
///
/// Rejects titles shorter than [`MIN_TITLE_CHARS`], empty links, and titles
/// containing any of the [`GARBAGE_PHRASES`] (case-insensitive).
pub fn is_valid_headline(title: &str, link: &str) -> bool {
    if title.chars().count() < MIN_TITLE_CHARS || link.is_empty() {
        return false;
    }
    let lower = title.to_lowercase();
    !GARBAGE_PHRASES.iter().any(|g| lower.contains(g))
}

/// The element's own `href`, or that of its nearest enclosing anchor.
fn element_href<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    el.value().attr("href").or_else(|| {
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "a")
            .and_then(|a| a.value().attr("href"))
    })
}

/// Run the headline cascade over an already-fetched homepage.
///
/// Tiers are evaluated in [`HEADLINE_TIERS`] order; the first one with more
/// than [`MIN_TIER_MATCHES`] matches is accepted and no later tier is looked
/// at. Every match of the accepted tier is turned into a candidate stamped
/// with `discovered_at`, then filtered by [`is_valid_headline`]. Repeated
/// links keep their first occurrence.
pub fn match_headlines(
    html: &str,
    page_url: &Url,
    source: &str,
    discovered_at: DateTime<Utc>,
) -> HeadlineMatch {
    let doc = Html::parse_document(html);

    let Some((tier, elements)) = HEADLINE_TIERS
        .iter()
        .map(|t| (t, t.select(&doc)))
        .find(|(_, els)| els.len() > MIN_TIER_MATCHES)
    else {
        return HeadlineMatch::default();
    };

    let candidates = elements
        .iter()
        .filter_map(|el| {
            let title = element_text(*el);
            let link = element_href(*el)
                .and_then(|href| resolve_url(page_url, href))
                .unwrap_or_default();
            if is_valid_headline(&title, &link) {
                Some(Candidate::new(title, link, Some(discovered_at), source))
            } else {
                debug!(title = %truncate_for_log(&title, 80), %link, "Rejected headline");
                None
            }
        })
        .unique_by(|c| c.link.clone())
        .collect();

    HeadlineMatch {
        tier: Some(tier.name),
        matched: elements.len(),
        candidates,
    }
}

/// Fetch a homepage and extract its headline list, never failing past this boundary.
///
/// # Returns
///
/// The accepted tier's valid candidates, or an empty vector if the fetch
/// failed or no tier cleared the threshold.
#[instrument(level = "info", skip_all, fields(%url, %source))]
pub async fn scrape_homepage<F: PageFetcher>(fetcher: &F, url: &str, source: &str) -> Vec<Candidate> {
    let page_url = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "Homepage URL is not absolute");
            return Vec::new();
        }
    };

    let html = match fetcher.fetch_text(url, HOMEPAGE_TIMEOUT).await {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, "Homepage fetch failed");
            return Vec::new();
        }
    };

    let found = match_headlines(&html, &page_url, source, Utc::now());
    match found.tier {
        Some(tier) => info!(
            tier,
            matched = found.matched,
            kept = found.candidates.len(),
            "Headline pattern matched"
        ),
        None => info!("No recognizable headline pattern found"),
    }
    found.candidates
}
