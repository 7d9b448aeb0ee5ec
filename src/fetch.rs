//! Outbound page fetching.
//!
//! Every network call in the pipeline goes through the [`PageFetcher`] trait
//! so the extraction cascades and the orchestrator can be exercised against
//! canned documents. [`HttpFetcher`] is the production implementation.
//!
//! # Request policy
//!
//! - A realistic desktop browser `User-Agent` is sent on every request;
//!   many news servers reject default client signatures outright.
//! - Each call carries its own timeout, chosen by the caller
//!   ([`FEED_TIMEOUT`], [`HOMEPAGE_TIMEOUT`], [`ARTICLE_BODY_TIMEOUT`],
//!   [`ARTICLE_IMAGE_TIMEOUT`]).
//! - Non-success statuses are errors.

use crate::utils::BoxError;
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Browser identification sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

pub const FEED_TIMEOUT: Duration = Duration::from_secs(5);
pub const HOMEPAGE_TIMEOUT: Duration = Duration::from_secs(10);
pub const ARTICLE_BODY_TIMEOUT: Duration = Duration::from_secs(5);
pub const ARTICLE_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on establishing a connection, independent of the per-call timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for fetching a document body by URL.
///
/// Timeouts, status handling and client identification are the
/// implementor's responsibility.
pub trait PageFetcher {
    /// Fetch `url` and return its body decoded as text.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, on timeout, or when the server
    /// answers with a non-success status.
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, BoxError>;

    /// Fetch `url` and return its body undecoded.
    ///
    /// Used for XML documents, whose encoding is declared in the prolog
    /// rather than in the HTTP headers.
    ///
    /// # Errors
    ///
    /// Same as [`PageFetcher::fetch_text`].
    async fn fetch_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, BoxError>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the browser `User-Agent` and a bounded connect timeout.
    pub fn new() -> Result<Self, BoxError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, BoxError> {
        let resp = self.client.get(url).timeout(timeout).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "Non-success response");
            return Err(format!("GET {url} returned {status}").into());
        }
        Ok(resp)
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url, timeout_ms = timeout.as_millis() as u64))]
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, BoxError> {
        let t0 = Instant::now();
        let body = self.get(url, timeout).await?.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }

    #[instrument(level = "debug", skip_all, fields(%url, timeout_ms = timeout.as_millis() as u64))]
    async fn fetch_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, BoxError> {
        let t0 = Instant::now();
        let body = self.get(url, timeout).await?.bytes().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched document"
        );
        Ok(body.to_vec())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_looks_like_a_browser() {
        assert!(BROWSER_USER_AGENT.starts_with("Mozilla/5.0"));
        assert!(BROWSER_USER_AGENT.contains("Chrome/"));
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[test]
    fn test_timeouts_are_bounded() {
        for t in [FEED_TIMEOUT, HOMEPAGE_TIMEOUT, ARTICLE_BODY_TIMEOUT, ARTICLE_IMAGE_TIMEOUT] {
            assert!(t >= Duration::from_secs(5) && t <= Duration::from_secs(10));
        }
    }
}
