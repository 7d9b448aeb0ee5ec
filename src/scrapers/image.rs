//! Representative image resolution.
//!
//! Publisher-declared images (Open Graph, Twitter card, `image_src`) are
//! trusted first. After that the resolver looks for the first image inside
//! the main content region, and finally accepts the first image anywhere on
//! the page, which may well be a logo.

use crate::fetch::{ARTICLE_IMAGE_TIMEOUT, PageFetcher};
use crate::scrapers::selector;
use crate::utils::resolve_url;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

/// One tier of the image cascade: the first element matching `selector`
/// contributes its `attr` value.
struct ImageTier {
    name: &'static str,
    selector: Selector,
    attr: &'static str,
}

static IMAGE_TIERS: Lazy<Vec<ImageTier>> = Lazy::new(|| {
    let tier = |name, css: &str, attr| ImageTier {
        name,
        selector: selector(css),
        attr,
    };
    vec![
        tier("Open Graph", "meta[property='og:image']", "content"),
        tier("Twitter Card", "meta[name='twitter:image']", "content"),
        tier("Link image_src", "link[rel='image_src']", "href"),
        tier(
            "Content Image",
            "div.article-body img, div.entry-content img, div.post-content img, article img, figure img",
            "src",
        ),
        tier("First Image", "img", "src"),
    ]
});

/// Resolve the representative image of an already-fetched article page.
///
/// Each tier looks only at its first matching element; a tier whose value is
/// empty or unresolvable hands over to the next one. Values are resolved
/// against `page_url` so relative references come back absolute.
///
/// # Returns
///
/// The winning tier's name and the absolute image URL, or `None` if every
/// tier came up empty.
pub fn resolve_image(html: &str, page_url: &Url) -> Option<(&'static str, String)> {
    let doc = Html::parse_document(html);

    IMAGE_TIERS.iter().find_map(|tier| {
        doc.select(&tier.selector)
            .next()
            .and_then(|el| el.value().attr(tier.attr))
            .and_then(|value| resolve_url(page_url, value))
            .map(|url| (tier.name, url))
    })
}

/// Fetch an article and resolve its representative image.
///
/// # Returns
///
/// The image URL, or `None` if the fetch failed or no tier matched. Failure
/// here never affects body extraction, which fetches on its own.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_image<F: PageFetcher>(fetcher: &F, url: &str) -> Option<String> {
    let page_url = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "Article URL is not absolute");
            return None;
        }
    };

    let html = match fetcher.fetch_text(url, ARTICLE_IMAGE_TIMEOUT).await {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, "Could not fetch image for article");
            return None;
        }
    };

    match resolve_image(&html, &page_url) {
        Some((tier, image)) => {
            debug!(tier, %image, "Resolved article image");
            Some(image)
        }
        None => {
            debug!("No image found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    fn page_url() -> Url {
        Url::parse("https://example.test/world/story-1").unwrap()
    }

    fn resolve(html: &str) -> Option<(&'static str, String)> {
        resolve_image(html, &page_url())
    }

    #[test]
    fn test_open_graph_wins_over_content_image() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://cdn.example.test/og.jpg">
            </head><body>
            <div class="article-body"><img src="/body.jpg"></div>
            </body></html>"#;
        assert_eq!(
            resolve(html),
            Some(("Open Graph", "https://cdn.example.test/og.jpg".to_string()))
        );
    }

    #[test]
    fn test_empty_og_falls_through_to_twitter() {
        let html = r#"<html><head>
            <meta property="og:image" content="">
            <meta name="twitter:image" content="https://cdn.example.test/tw.jpg">
            </head><body></body></html>"#;
        assert_eq!(
            resolve(html),
            Some(("Twitter Card", "https://cdn.example.test/tw.jpg".to_string()))
        );
    }

    #[test]
    fn test_link_image_src() {
        let html = r#"<html><head><link rel="image_src" href="/legacy.png"></head>
            <body><img src="/logo.png"></body></html>"#;
        assert_eq!(
            resolve(html),
            Some(("Link image_src", "https://example.test/legacy.png".to_string()))
        );
    }

    #[test]
    fn test_content_image_beats_earlier_logo() {
        let html = r#"<html><body>
            <header><img src="/logo.png"></header>
            <figure><img src="photos/main.jpg"></figure>
            </body></html>"#;
        assert_eq!(
            resolve(html),
            Some(("Content Image", "https://example.test/world/photos/main.jpg".to_string()))
        );
    }

    #[test]
    fn test_first_image_is_last_resort() {
        let html = r#"<html><body><header><img src="/logo.png"></header></body></html>"#;
        assert_eq!(
            resolve(html),
            Some(("First Image", "https://example.test/logo.png".to_string()))
        );
    }

    #[test]
    fn test_no_image_at_all() {
        assert_eq!(resolve("<html><body><p>Text only</p></body></html>"), None);
    }

    #[tokio::test]
    async fn test_fetch_image_failure_is_none() {
        let f = StaticFetcher::new();
        assert_eq!(fetch_image(&f, "https://example.test/missing").await, None);
    }

    #[tokio::test]
    async fn test_fetch_image_resolves() {
        let f = StaticFetcher::new().with_page(
            "https://example.test/world/story-1",
            r#"<html><head><meta property="og:image" content="/og.jpg"></head></html>"#,
        );
        assert_eq!(
            fetch_image(&f, "https://example.test/world/story-1").await.as_deref(),
            Some("https://example.test/og.jpg")
        );
    }
}
