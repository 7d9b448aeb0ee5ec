//! Structured feed adapter (RSS 0.9x/1.0/2.0, Atom, JSON Feed).
//!
//! Feed documents are parsed with `feed-rs`; this module only maps the
//! parsed entries onto [`Candidate`]s and owns the failure policy: any fetch
//! or parse error is logged and turned into an empty list, which the
//! orchestrator treats exactly like "nothing new".

use crate::fetch::{FEED_TIMEOUT, PageFetcher};
use crate::models::Candidate;
use crate::utils::BoxError;
use tracing::{debug, info, instrument, warn};

/// Source label used when a feed does not declare its own title.
pub const FALLBACK_FEED_LABEL: &str = "RSS Feed";

/// Parse a feed document into unenriched candidates.
///
/// Per entry: title and first link verbatim (trimmed), publish time when
/// present, body from the entry summary/description, and source from the
/// feed title. Entries without a title or link are skipped since they cannot
/// be displayed or deduplicated.
///
/// # Errors
///
/// Returns an error if the document is not a recognizable feed.
pub fn parse_feed(document: &[u8]) -> Result<Vec<Candidate>, BoxError> {
    let feed =
        feed_rs::parser::parse(document).map_err(|e| format!("feed parse failed: {e}"))?;

    let source = feed
        .title
        .as_ref()
        .map(|t| t.content.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(FALLBACK_FEED_LABEL)
        .to_string();

    let mut out = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default();
        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            debug!(%title, %link, "Skipping feed entry without title or link");
            continue;
        }

        let mut candidate = Candidate::new(title, link, entry.published, source.clone());
        if let Some(summary) = entry.summary {
            candidate.body = summary.content;
        }
        out.push(candidate);
    }
    Ok(out)
}

/// Fetch and parse a feed, never failing past this boundary.
///
/// # Returns
///
/// The feed's candidates, or an empty vector if the fetch or parse failed.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_feed<F: PageFetcher>(fetcher: &F, url: &str) -> Vec<Candidate> {
    // Raw bytes: the XML prolog, not the HTTP charset, names the encoding.
    let document = match fetcher.fetch_bytes(url, FEED_TIMEOUT).await {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "Feed fetch failed");
            return Vec::new();
        }
    };

    match parse_feed(&document) {
        Ok(candidates) => {
            info!(count = candidates.len(), "Parsed feed entries");
            candidates
        }
        Err(e) => {
            warn!(error = %e, "Feed parse failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use chrono::{TimeZone, Utc};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>BBC News - World</title>
    <link>https://www.bbc.co.uk/news/world</link>
    <description>World news</description>
    <item>
      <title>Leaders meet for climate summit in Geneva</title>
      <link>https://www.bbc.co.uk/news/world-1</link>
      <description>Talks began on Monday.</description>
      <pubDate>Tue, 06 May 2025 20:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Storm closes ports along the northern coast</title>
      <link>https://www.bbc.co.uk/news/world-2</link>
    </item>
    <item>
      <description>Entry without title or link</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_UNTITLED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>urn:uuid:feed</id>
  <title></title>
  <updated>2025-05-06T12:00:00Z</updated>
  <entry>
    <id>urn:uuid:1</id>
    <title>Central bank holds rates steady again</title>
    <link href="https://wire.example.org/rates"/>
    <updated>2025-05-06T12:00:00Z</updated>
    <summary>No change this quarter.</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_maps_entries() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "Leaders meet for climate summit in Geneva");
        assert_eq!(first.link, "https://www.bbc.co.uk/news/world-1");
        assert_eq!(first.source, "BBC News - World");
        assert_eq!(first.body, "Talks began on Monday.");
        assert_eq!(
            first.published_at,
            Some(Utc.with_ymd_and_hms(2025, 5, 6, 20, 30, 0).unwrap())
        );
        assert!(first.image_url.is_none());

        let second = &items[1];
        assert_eq!(second.published_at, None);
        assert_eq!(second.body, "");
    }

    #[test]
    fn test_parse_feed_falls_back_to_generic_label() {
        let items = parse_feed(ATOM_UNTITLED.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, FALLBACK_FEED_LABEL);
        assert_eq!(items[0].link, "https://wire.example.org/rates");
        assert_eq!(items[0].body, "No change this quarter.");
    }

    #[test]
    fn test_parse_feed_rejects_html() {
        assert!(parse_feed(b"<html><body><p>not a feed</p></body></html>").is_err());
    }

    #[tokio::test]
    async fn test_fetch_feed_returns_entries() {
        let f = StaticFetcher::new().with_page("https://feeds.example.org/rss", RSS);
        let items = fetch_feed(&f, "https://feeds.example.org/rss").await;
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_feed_honours_declared_latin1_encoding() {
        let mut doc = br#"<?xml version="1.0" encoding="ISO-8859-1"?>
<rss version="2.0"><channel><title>City Desk</title>
<item><title>Caf"#
            .to_vec();
        doc.push(0xE9);
        doc.extend_from_slice(
            br#" owners protest new city rules</title><link>https://city.example.org/cafe</link></item>
</channel></rss>"#,
        );

        let f = StaticFetcher::new().with_page("https://city.example.org/rss", doc);
        let items = fetch_feed(&f, "https://city.example.org/rss").await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Caf\u{e9} owners protest new city rules");
    }

    #[tokio::test]
    async fn test_fetch_feed_swallows_failures() {
        let f = StaticFetcher::new().with_page("https://feeds.example.org/broken", "<<<garbage");
        assert!(fetch_feed(&f, "https://feeds.example.org/broken").await.is_empty());
        assert!(fetch_feed(&f, "https://feeds.example.org/missing").await.is_empty());
    }
}
