//! Configuration management for ExploreFlix.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `omdb.api_key`
pub const OMDB_API_KEY_ENV: &str = "EXPLOREFLIX_OMDB_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Request gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Jikan (anime provider) settings
    #[serde(default)]
    pub jikan: JikanConfig,

    /// OMDb (movie and series provider) settings
    #[serde(default)]
    pub omdb: OmdbConfig,

    /// Aggregation limits and seed terms
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Recent search history
    #[serde(default)]
    pub recent_searches: RecentSearchesConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Request gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Attempts per request, including the first one
    pub max_attempts: u32,

    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,

    /// Backoff unit after a failed attempt, multiplied by the attempt number
    pub retry_delay_ms: u64,

    /// Backoff unit after an HTTP 429, multiplied by the attempt number
    pub rate_limited_delay_ms: u64,
}

/// Token bucket settings for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum burst size
    pub capacity: u32,

    /// Tokens added per second
    pub refill_per_second: f64,
}

/// Jikan API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

/// OMDb API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    /// OMDb API base URL
    pub base_url: String,

    /// OMDb API key
    pub api_key: String,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

/// Aggregator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Maximum records returned by browse and trending operations
    pub max_results: usize,

    /// Detail lookups per seed term when browsing movies or series
    pub detail_prefix_per_term: usize,

    /// Detail lookups for a direct movie or series search
    pub search_detail_limit: usize,

    /// Page size for anime facets on the trending list
    pub anime_facet_limit: u32,

    /// Page size for anime search
    pub anime_search_limit: u32,

    /// Seed terms for the movie browse list
    pub movie_seed_terms: Vec<String>,

    /// Seed terms for the series browse list
    pub series_seed_terms: Vec<String>,
}

/// Recent searches configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentSearchesConfig {
    /// File name (relative to data directory or absolute)
    pub file: String,

    /// Number of searches kept
    pub capacity: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_ms: 10_000,
            retry_delay_ms: 500,
            rate_limited_delay_ms: 1000,
        }
    }
}

impl RateLimitConfig {
    pub fn per_second(requests: u32) -> Self {
        Self {
            capacity: requests,
            refill_per_second: f64::from(requests),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_second(1)
    }
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            // Jikan allows 3 requests per second
            rate_limit: RateLimitConfig::per_second(3),
        }
    }
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.omdbapi.com".to_string(),
            api_key: String::new(),
            rate_limit: RateLimitConfig::per_second(5),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_results: 8,
            detail_prefix_per_term: 2,
            search_detail_limit: 8,
            anime_facet_limit: 4,
            anime_search_limit: 10,
            movie_seed_terms: ["action", "drama", "comedy", "thriller"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            series_seed_terms: ["drama", "comedy", "action", "sci-fi"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for RecentSearchesConfig {
    fn default() -> Self {
        Self {
            file: "recent_searches.json".to_string(),
            capacity: crate::recents::DEFAULT_CAPACITY,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            logging: LoggingConfig::default(),
            gateway: GatewayConfig::default(),
            jikan: JikanConfig::default(),
            omdb: OmdbConfig::default(),
            catalog: CatalogConfig::default(),
            recent_searches: RecentSearchesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Replace the OMDb API key with `key` when it is set and non-empty
    pub fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.omdb.api_key = key;
        }
    }

    /// Read overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_api_key_override(std::env::var(OMDB_API_KEY_ENV).ok());
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the absolute path for the recent searches file
    pub fn recent_searches_path(&self) -> PathBuf {
        self.resolve(&self.recent_searches.file)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.gateway.max_attempts, 3);
        assert_eq!(config.gateway.timeout_ms, 10_000);
        assert_eq!(config.catalog.max_results, 8);
        assert_eq!(config.catalog.detail_prefix_per_term, 2);
        assert_eq!(config.catalog.movie_seed_terms.len(), 4);
        assert_eq!(config.recent_searches.capacity, 5);
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.omdb.api_key = "abc123".to_string();
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(loaded_config.jikan.base_url, original_config.jikan.base_url);
        assert_eq!(loaded_config.omdb.api_key, "abc123");
        assert_eq!(
            loaded_config.catalog.series_seed_terms,
            original_config.catalog.series_seed_terms
        );

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[gateway]
max_attempts = 5
timeout_ms = 2000
retry_delay_ms = 100
rate_limited_delay_ms = 200
"#,
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.gateway.max_attempts, 5);
        assert_eq!(config.catalog.max_results, 8);
        assert_eq!(config.jikan.base_url, "https://api.jikan.moe/v4");

        Ok(())
    }

    #[test]
    fn test_partial_section_uses_field_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[omdb]\napi_key = \"abc\"\n")?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.omdb.api_key, "abc");
        assert_eq!(config.omdb.base_url, "https://www.omdbapi.com");
        assert_eq!(config.omdb.rate_limit.capacity, 5);
        assert_eq!(config.omdb.rate_limit.refill_per_second, 5.0);
        assert_eq!(config.gateway.max_attempts, 3);

        Ok(())
    }

    #[test]
    fn test_partial_rate_limit_table() {
        let config: Config = toml::from_str("[jikan.rate_limit]\ncapacity = 10\n").unwrap();
        assert_eq!(config.jikan.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.jikan.rate_limit.capacity, 10);
        assert_eq!(config.jikan.rate_limit.refill_per_second, 1.0);
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config.data.root_dir, "data");
    }

    #[test]
    fn test_api_key_override() {
        let mut config = Config::default();
        config.apply_api_key_override(Some("  ".to_string()));
        assert_eq!(config.omdb.api_key, "");

        config.apply_api_key_override(Some("k3y".to_string()));
        assert_eq!(config.omdb.api_key, "k3y");

        config.apply_api_key_override(None);
        assert_eq!(config.omdb.api_key, "k3y");
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();

        let log_dir = config.log_dir();
        assert!(log_dir.ends_with("data/logs"));

        let recent = config.recent_searches_path();
        assert!(recent.ends_with("data/recent_searches.json"));
    }
}
