//! Quotebook configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main Quotebook configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotebookConfig {
    /// Catalog behaviour
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Session cache configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Remote sync configuration
    #[serde(default)]
    pub sync: SyncConfig,

    /// Local HTTP API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

impl QuotebookConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Default config file location (`<config dir>/quotebook/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|p| p.join("quotebook").join("config.toml"))
    }
}

/// How category labels are compared when filtering and listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryMatch {
    /// Labels must match byte for byte
    Exact,
    /// Labels match ignoring case, consistent with the dedup key
    #[default]
    CaseInsensitive,
}

impl CategoryMatch {
    /// Whether `candidate` matches the requested `category`
    pub fn matches(self, candidate: &str, category: &str) -> bool {
        match self {
            Self::Exact => candidate == category,
            Self::CaseInsensitive => candidate.to_lowercase() == category.to_lowercase(),
        }
    }
}

/// Catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Category comparison rule
    #[serde(default)]
    pub category_match: CategoryMatch,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for persistent slots
    pub data_dir: PathBuf,

    /// Key holding the serialized catalog
    pub catalog_key: String,

    /// Maximum bytes a single slot value may occupy (None = unlimited)
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs_next::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("quotebook"),
            catalog_key: "quotes".to_string(),
            quota_bytes: Some(5 * 1024 * 1024),
        }
    }
}

/// Session cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Keep the session on disk between CLI invocations
    pub persist: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { persist: true }
    }
}

/// Remote sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Enable the periodic poller when serving
    pub enabled: bool,

    /// Remote collection endpoint
    pub endpoint: String,

    /// Result limit sent as `_limit` (None = no limit parameter)
    pub limit: Option<u32>,

    /// Poll period in seconds
    pub interval_secs: u64,

    /// Category assigned to every pulled quote
    pub category_label: String,

    /// Push each newly added quote to the remote
    pub push_on_add: bool,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Push retry policy
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://jsonplaceholder.typicode.com/posts".to_string(),
            limit: Some(5),
            interval_secs: 15,
            category_label: "Server".to_string(),
            push_on_add: true,
            timeout_secs: 10,
            retry: RetryConfig::default(),
        }
    }
}

/// Bounded retry policy for pushes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first (1 = no retry)
    pub max_attempts: usize,

    /// Backoff unit in milliseconds; attempt `n` waits `n * base_backoff_ms`
    pub base_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_backoff_ms: 250,
        }
    }
}

/// Local HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
            cors_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuotebookConfig::default();
        assert_eq!(config.sync.interval_secs, 15);
        assert_eq!(config.sync.category_label, "Server");
        assert_eq!(config.sync.limit, Some(5));
        assert_eq!(config.storage.catalog_key, "quotes");
        assert_eq!(config.catalog.category_match, CategoryMatch::CaseInsensitive);
        assert_eq!(config.sync.retry.max_attempts, 1);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [catalog]
            category_match = "exact"

            [sync]
            enabled = false
            endpoint = "http://localhost:9999/posts"
            interval_secs = 10
            category_label = "server"
            push_on_add = false
            timeout_secs = 3
        "#;
        let config: QuotebookConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.category_match, CategoryMatch::Exact);
        assert!(!config.sync.enabled);
        assert_eq!(config.sync.limit, Some(5));
        assert_eq!(config.sync.retry, RetryConfig::default());
        assert_eq!(config.api.port, 18800);
    }

    #[test]
    fn test_section_without_optional_keys_keeps_defaults() {
        let config: QuotebookConfig = toml::from_str("[sync]\ninterval_secs = 10\n").unwrap();
        assert_eq!(config.sync.interval_secs, 10);
        assert_eq!(config.sync.limit, Some(5));

        let config: QuotebookConfig =
            toml::from_str("[storage]\ncatalog_key = \"quotes\"\n").unwrap();
        assert_eq!(config.storage.quota_bytes, Some(5 * 1024 * 1024));
    }

    #[test]
    fn test_single_key_section() {
        let config: QuotebookConfig = toml::from_str("[storage]\nquota_bytes = 1024\n").unwrap();
        assert_eq!(config.storage.quota_bytes, Some(1024));
        assert_eq!(config.storage.catalog_key, "quotes");
        assert!(config.session.persist);
    }

    #[test]
    fn test_config_round_trip_toml() {
        let config = QuotebookConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: QuotebookConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.sync.endpoint, config.sync.endpoint);
        assert_eq!(parsed.storage.data_dir, config.storage.data_dir);
    }

    #[test]
    fn test_category_match() {
        assert!(CategoryMatch::Exact.matches("Motivation", "Motivation"));
        assert!(!CategoryMatch::Exact.matches("motivation", "Motivation"));
        assert!(CategoryMatch::CaseInsensitive.matches("motivation", "Motivation"));
        assert!(!CategoryMatch::CaseInsensitive.matches("Focus", "Motivation"));
    }

    #[test]
    fn test_from_file_reports_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sync\nbroken").unwrap();
        let err = QuotebookConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
