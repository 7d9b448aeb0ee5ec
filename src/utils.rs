//! Utility functions for text handling, logging, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace normalization of scraped element text
//! - Character-safe truncation for body excerpts and log previews
//! - Relative-to-absolute URL resolution
//! - File system validation for output directories

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Error type used at every fallible seam of the pipeline.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// Scraped element text arrives as many fragments with newlines and
/// indentation from the surrounding markup; this produces the visible text
/// a reader would see.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate `s` to at most `max` characters, appending `marker` when cut.
///
/// Counts characters, not bytes, so multi-byte text is never split inside a
/// code point.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("abcdef", 3, "..."), "abc...");
/// assert_eq!(truncate_chars("abc", 3, "..."), "abc");
/// ```
pub fn truncate_chars(s: &str, max: usize, marker: &str) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &s[..cut], marker),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
        None => s.to_string(),
    }
}

/// Resolve `href` against `base`, returning an absolute URL.
///
/// Returns `None` for empty references and anything that cannot be resolved
/// (e.g. `javascript:` pseudo-links are kept out by requiring an http(s)
/// scheme on the result).
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), BoxError> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
