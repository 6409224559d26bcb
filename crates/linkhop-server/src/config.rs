//! Configuration management for linkhop.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! # Configuration Hierarchy
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use linkhop_server::config::LinkhopConfig;
//!
//! // Load from file with env overrides
//! let config = LinkhopConfig::load("linkhop.yaml")?;
//!
//! // Or load from environment only
//! let config = LinkhopConfig::from_env()?;
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use linkhop_domain::{
    Blocklist, CacheStore, PathCache, PathCacheConfig, SearchConfig, SearchLimits, SearchProfile,
};

const ENV_PREFIX: &str = "LINKHOP";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LinkhopConfig {
    /// Per-profile search limits
    #[serde(default)]
    pub search: SearchSettings,

    /// Path cache settings
    #[serde(default)]
    pub cache: CacheSettings,

    /// Titles excluded from traversal on top of the built-in list
    #[serde(default)]
    pub blocklist: BlocklistSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Limits of one search profile.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProfileSettings {
    /// Maximum combined depth of both search trees
    pub max_depth: u32,

    /// Maximum number of titles discovered
    pub max_nodes: usize,

    /// Wall-clock budget in milliseconds
    pub max_time_ms: u64,
}

impl ProfileSettings {
    pub fn to_limits(self) -> SearchLimits {
        SearchLimits::new(
            self.max_depth,
            self.max_nodes,
            Duration::from_millis(self.max_time_ms),
        )
    }
}

impl From<SearchLimits> for ProfileSettings {
    fn from(limits: SearchLimits) -> Self {
        Self {
            max_depth: limits.max_depth,
            max_nodes: limits.max_nodes,
            max_time_ms: limits.max_time.as_millis() as u64,
        }
    }
}

/// Search settings.
///
/// Each profile can be overridden as a whole or field by field, e.g.
/// `LINKHOP_SEARCH__FULL__MAX_TIME_MS=8000`.
///
/// # Example YAML Configuration
///
/// ```yaml
/// search:
///   quick:
///     max_depth: 5
///     max_nodes: 5000
///     max_time_ms: 1500
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SearchSettings {
    #[serde(default = "default_quick")]
    pub quick: ProfileSettings,

    #[serde(default = "default_full")]
    pub full: ProfileSettings,

    #[serde(default = "default_extended")]
    pub extended: ProfileSettings,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            quick: default_quick(),
            full: default_full(),
            extended: default_extended(),
        }
    }
}

impl SearchSettings {
    pub fn profile(&self, profile: SearchProfile) -> ProfileSettings {
        match profile {
            SearchProfile::Quick => self.quick,
            SearchProfile::Full => self.full,
            SearchProfile::Extended => self.extended,
        }
    }
}

fn default_quick() -> ProfileSettings {
    SearchProfile::Quick.default_limits().into()
}

fn default_full() -> ProfileSettings {
    SearchProfile::Full.default_limits().into()
}

fn default_extended() -> ProfileSettings {
    SearchProfile::Extended.default_limits().into()
}

/// Path cache settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CacheSettings {
    /// Enable the path cache
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of entries held by the in-process store
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,

    /// Entry lifetime in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Prefix of every cache key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: default_max_capacity(),
            ttl_secs: default_ttl_secs(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_capacity() -> u64 {
    100_000
}

fn default_ttl_secs() -> u64 {
    PathCacheConfig::default().ttl.as_secs()
}

fn default_key_prefix() -> String {
    PathCacheConfig::default().key_prefix
}

/// Blocklist settings.
///
/// `LINKHOP_BLOCKLIST__EXTRA_TITLES` takes a comma-separated list.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BlocklistSettings {
    #[serde(default)]
    pub extra_titles: Vec<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format (true for production, false for development)
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl LinkhopConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `LINKHOP_` and use `__` as separator.
    /// For example:
    /// - `LINKHOP_CACHE__TTL_SECS=3600` overrides `cache.ttl_secs`
    /// - `LINKHOP_SEARCH__QUICK__MAX_NODES=2000` overrides `search.quick.max_nodes`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&LinkhopConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(environment())
            .build()?;

        let loaded: LinkhopConfig = config.try_deserialize()?;
        loaded.validate()?;

        Ok(loaded)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&LinkhopConfig::default())?)
            .add_source(environment())
            .build()?;

        let loaded: LinkhopConfig = config.try_deserialize()?;
        loaded.validate()?;

        Ok(loaded)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        for profile in [
            SearchProfile::Quick,
            SearchProfile::Full,
            SearchProfile::Extended,
        ] {
            let settings = self.search.profile(profile);
            if settings.max_depth == 0 {
                return Err(invalid(format!(
                    "search.{profile}.max_depth must be greater than 0"
                )));
            }
            if settings.max_nodes == 0 {
                return Err(invalid(format!(
                    "search.{profile}.max_nodes must be greater than 0"
                )));
            }
            if settings.max_time_ms == 0 {
                return Err(invalid(format!(
                    "search.{profile}.max_time_ms must be greater than 0"
                )));
            }
        }

        if self.cache.enabled {
            if self.cache.max_capacity == 0 {
                return Err(invalid(
                    "cache.max_capacity must be greater than 0".to_string(),
                ));
            }
            if self.cache.ttl_secs == 0 {
                return Err(invalid("cache.ttl_secs must be greater than 0".to_string()));
            }
            if self.cache.key_prefix.trim().is_empty() {
                return Err(invalid("cache.key_prefix cannot be empty".to_string()));
            }
        }

        if let Some(index) = self
            .blocklist
            .extra_titles
            .iter()
            .position(|title| title.trim().is_empty())
        {
            return Err(invalid(format!(
                "blocklist.extra_titles[{index}] cannot be empty"
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(invalid(format!(
                "logging.level must be one of: {:?}, got: {}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }

    /// The built-in blocklist extended with `blocklist.extra_titles`.
    pub fn blocklist(&self) -> Blocklist {
        Blocklist::new().with_titles(self.blocklist.extra_titles.iter())
    }

    pub fn path_cache_config(&self) -> PathCacheConfig {
        PathCacheConfig::default()
            .with_ttl(Duration::from_secs(self.cache.ttl_secs))
            .with_key_prefix(self.cache.key_prefix.clone())
    }

    /// Builds the engine configuration.
    ///
    /// The cache is attached only when it is enabled and a store is given.
    pub fn search_config(&self, store: Option<Arc<dyn CacheStore>>) -> SearchConfig {
        let blocklist = Arc::new(self.blocklist());
        let mut config = SearchConfig::default()
            .with_blocklist(Arc::clone(&blocklist))
            .with_profile_limits(SearchProfile::Quick, self.search.quick.to_limits())
            .with_profile_limits(SearchProfile::Full, self.search.full.to_limits())
            .with_profile_limits(SearchProfile::Extended, self.search.extended.to_limits());

        if let (true, Some(store)) = (self.cache.enabled, store) {
            let cache = PathCache::new(store, blocklist, self.path_cache_config());
            config = config.with_cache(Arc::new(cache));
        }

        config
    }
}

fn environment() -> Environment {
    // LINKHOP_SEARCH__FULL__MAX_DEPTH -> search.full.max_depth
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("blocklist.extra_titles")
}

fn invalid(message: String) -> ConfigLoadError {
    ConfigLoadError::Invalid { message }
}
