//! Ingestion configuration: the source registry and scheduling knobs.
//!
//! Configuration is read once at startup from an optional YAML file and is
//! then passed by value into the orchestrator. Nothing here is reloaded at
//! runtime.
//!
//! # File format
//!
//! ```yaml
//! interval_secs: 60
//! source_concurrency: 4
//! sources:
//!   - { name: "BBC News", url: "https://feeds.bbci.co.uk/news/world/rss.xml", kind: feed }
//!   - { name: "Zee News", url: "https://zeenews.india.com/", kind: pattern }
//! ```
//!
//! Every key is optional; omitted keys take the values from
//! [`AppConfig::default`].

use crate::models::{SourceDescriptor, SourceKind};
use crate::utils::BoxError;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, instrument};
use url::Url;

/// Runtime configuration for the ingestion service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Seconds between the starts of consecutive cycles.
    pub interval_secs: u64,
    /// How many sources of the same kind are processed at once.
    pub source_concurrency: usize,
    /// Every source ingested in a cycle.
    pub sources: Vec<SourceDescriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            source_concurrency: 4,
            sources: default_sources(),
        }
    }
}

/// Built-in sources used when no configuration file is given.
pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new(
            "BBC News",
            "https://feeds.bbci.co.uk/news/world/rss.xml",
            SourceKind::Feed,
        ),
        SourceDescriptor::new(
            "Times of India",
            "https://timesofindia.indiatimes.com/rssfeedstopstories.cms",
            SourceKind::Feed,
        ),
        SourceDescriptor::new("Zee News", "https://zeenews.india.com/", SourceKind::Pattern),
        SourceDescriptor::new("Rainbow News", "https://rainbownews.in/", SourceKind::Pattern),
    ]
}

impl AppConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, BoxError> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the orchestrator relies on.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found:
    /// - `interval_secs` or `source_concurrency` is zero
    /// - a source has a blank name or a duplicate name
    /// - a source URL is not an absolute http(s) URL
    pub fn validate(&self) -> Result<(), BoxError> {
        if self.interval_secs == 0 {
            return Err("interval_secs must be greater than zero".into());
        }
        if self.source_concurrency == 0 {
            return Err("source_concurrency must be greater than zero".into());
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(format!("source with url {:?} has a blank name", source.url).into());
            }
            if !names.insert(source.name.as_str()) {
                return Err(format!("duplicate source name {:?}", source.name).into());
            }
            match Url::parse(&source.url) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => {
                    return Err(format!(
                        "source {:?} has invalid url {:?}",
                        source.name, source.url
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Load configuration from `path`, or the built-in defaults when `path` is `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML for
/// [`AppConfig`], or fails [`AppConfig::validate`].
#[instrument(level = "info")]
pub fn load_config(path: Option<&str>) -> Result<AppConfig, BoxError> {
    let config = match path {
        Some(p) => {
            let yaml = std::fs::read_to_string(p)
                .map_err(|e| format!("reading config from {p}: {e}"))?;
            AppConfig::from_yaml(&yaml)?
        }
        None => AppConfig::default(),
    };
    info!(
        sources = config.sources.len(),
        interval_secs = config.interval_secs,
        source_concurrency = config.source_concurrency,
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.sources.len(), 4);
        assert_eq!(
            config.sources.iter().filter(|s| s.kind == SourceKind::Feed).count(),
            2
        );
    }

    #[test]
    fn test_from_yaml_with_partial_keys() {
        let yaml = r#"
sources:
  - { name: "Example Wire", url: "https://example.test/", kind: pattern }
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.source_concurrency, 4);
        assert_eq!(
            config.sources,
            vec![SourceDescriptor::new(
                "Example Wire",
                "https://example.test/",
                SourceKind::Pattern
            )]
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::from_yaml("interval_secs: 0").is_err());
        assert!(AppConfig::from_yaml("source_concurrency: 0").is_err());
        assert!(AppConfig::from_yaml("unknown_key: 1").is_err());
        assert!(AppConfig::from_yaml(
            "sources: [{ name: ' ', url: 'https://a.test/', kind: feed }]"
        )
        .is_err());
        assert!(AppConfig::from_yaml(
            "sources: [{ name: 'A', url: '/relative', kind: feed }]"
        )
        .is_err());
        assert!(AppConfig::from_yaml(
            "sources: [{ name: 'A', url: 'ftp://a.test/feed', kind: feed }]"
        )
        .is_err());
        assert!(AppConfig::from_yaml(
            "sources: [{ name: 'A', url: 'https://a.test/', kind: feed }, { name: 'A', url: 'https://b.test/', kind: pattern }]"
        )
        .is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(
            &path,
            "interval_secs: 120\nsources:\n  - { name: Wire, url: 'https://wire.test/rss', kind: feed }\n",
        )
        .unwrap();
        let config = load_config(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.interval_secs, 120);
        assert_eq!(config.sources[0].kind, SourceKind::Feed);
    }

    #[test]
    fn test_load_config_missing_file_is_error() {
        assert!(load_config(Some("/nonexistent/config.yaml")).is_err());
        assert_eq!(load_config(None).unwrap(), AppConfig::default());
    }
}
