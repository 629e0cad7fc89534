//! Site configuration schema.
//!
//! Mirrors `booknav.yaml`. Every field has a default, so an empty mapping
//! (or no file at all) yields the stock three-root site layout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::contributors::{DEFAULT_API_BASE, DEFAULT_CACHE_TTL, DEFAULT_OWNER, DEFAULT_REPO};
use crate::headings::DEFAULT_CONTENT_CLASS;
use crate::model::ContentRoot;
use crate::scanner::emit::DEFAULT_BINDING;
use crate::scanner::{DEFAULT_CHAPTERS_DIR, ScanOptions};

/// Top-level site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content roots, scanned in this order.
    pub roots: Vec<RootConfig>,

    /// Recognized content file extensions.
    pub extensions: Vec<String>,

    /// Name of nested chapter source directories.
    pub chapters_dir: String,

    /// Global binding used by the script output form.
    pub binding: String,

    /// Class marking the content container in chapter pages.
    pub content_class: String,

    /// Timeout for page fetches.
    #[serde(with = "humantime_format")]
    pub fetch_timeout: Duration,

    /// Contributor leaderboard settings.
    pub contributors: ContributorsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            roots: vec![
                RootConfig::new("math-foundations", "📐 Math Foundations"),
                RootConfig::new("books", "📚 Books"),
                RootConfig::new("papers", "📄 Papers"),
            ],
            extensions: vec!["html".to_string()],
            chapters_dir: DEFAULT_CHAPTERS_DIR.to_string(),
            binding: DEFAULT_BINDING.to_string(),
            content_class: DEFAULT_CONTENT_CLASS.to_string(),
            fetch_timeout: super::loader::default_fetch_timeout(),
            contributors: ContributorsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Content roots in scan order.
    #[must_use]
    pub fn content_roots(&self) -> Vec<ContentRoot> {
        self.roots.iter().map(RootConfig::to_content_root).collect()
    }

    /// Scanner options derived from this configuration.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            extensions: self.extensions.clone(),
            chapters_dir: self.chapters_dir.clone(),
        }
    }
}

/// A configured content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    /// Section id.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Directory relative to the site root; defaults to `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl RootConfig {
    /// Creates a root whose directory is named after its id.
    #[must_use]
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            path: None,
        }
    }

    /// Converts to the scanner's root type.
    #[must_use]
    pub fn to_content_root(&self) -> ContentRoot {
        ContentRoot {
            id: self.id.clone(),
            title: self.title.clone(),
            path: self.path.clone().unwrap_or_else(|| self.id.clone()),
        }
    }
}

/// Contributor leaderboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContributorsConfig {
    /// Repository owner.
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// API base URL.
    pub api_base: String,

    /// How long a fetched list is reused.
    #[serde(with = "humantime_format")]
    pub cache_ttl: Duration,
}

impl Default for ContributorsConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Durations as human-readable strings (`10s`, `24h`, `1m 30s`).
mod humantime_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        let ids: Vec<_> = config.roots.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["math-foundations", "books", "papers"]);
        assert_eq!(config.binding, "MAIN_NAV_DATA");
        assert_eq!(config.contributors.cache_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "roots:\n  - id: notes\n    title: Notes\n    path: site/notes\nfetch_timeout: 2s 500ms\n";
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.content_roots()[0].path, "site/notes");
        assert_eq!(config.fetch_timeout, Duration::from_millis(2500));
        assert_eq!(config.chapters_dir, "chapters");
        assert_eq!(config.contributors.repo, "ml-meta");
    }

    #[test]
    fn test_root_path_defaults_to_id() {
        assert_eq!(RootConfig::new("books", "Books").to_content_root().path, "books");
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_durations() {
        assert!(serde_yaml::from_str::<SiteConfig>("colour: blue").is_err());
        assert!(serde_yaml::from_str::<SiteConfig>("fetch_timeout: soon").is_err());
    }

    #[test]
    fn test_duration_serializes_human_readable() {
        let yaml = serde_yaml::to_string(&ContributorsConfig::default()).unwrap();
        assert!(yaml.contains("cache_ttl: 1day"), "{yaml}");
    }
}
