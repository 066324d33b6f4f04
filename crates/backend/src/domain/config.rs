//! Configuration for quarry.
//!
//! Config priority: explicit path > `QUARRY_CONFIG` > user (~/.config/quarry/config.toml) > defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::outcome::SuggestionKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read config {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

// ============================================================================
// Remote Configuration
// ============================================================================

/// Remote search service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
  /// Base URL of the search service API
  pub base_url: String,

  /// Bearer token. If not set, reads from QUARRY_API_KEY env var
  #[serde(skip_serializing_if = "Option::is_none")]
  pub api_key: Option<String>,

  /// Per-request timeout in milliseconds
  pub timeout_ms: u64,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8080/api".to_string(),
      api_key: None,
      timeout_ms: 10_000,
    }
  }
}

// ============================================================================
// Search Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
  /// Page size used until the user picks another (default: 20)
  pub default_page_size: u32,

  /// Upper bound for any page size (default: 100)
  pub max_page_size: u32,

  /// Ask the service for facet counts alongside results
  pub include_facets: bool,

  /// Cached outcomes kept per controller, 0 disables caching (default: 256)
  pub cache_capacity: u64,

  /// Seconds a cached outcome stays valid (default: 60)
  pub cache_ttl_secs: u64,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      default_page_size: 20,
      max_page_size: 100,
      include_facets: true,
      cache_capacity: 256,
      cache_ttl_secs: 60,
    }
  }
}

// ============================================================================
// Suggestion Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
  /// Minimum characters before the remote service is asked (default: 2)
  pub min_chars: usize,

  /// Quiet period after the last keystroke before fetching (default: 150)
  pub debounce_ms: u64,

  /// Maximum suggestions requested (default: 8)
  pub limit: usize,

  /// Suggestion sources requested from the service
  pub types: Vec<SuggestionKind>,
}

impl Default for SuggestConfig {
  fn default() -> Self {
    Self {
      min_chars: 2,
      debounce_ms: 150,
      limit: 8,
      types: vec![SuggestionKind::Query, SuggestionKind::Title, SuggestionKind::Tag],
    }
  }
}

// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level: off, error, warn, info, debug, trace (default: info)
  pub level: String,

  /// Write logs to this file instead of stderr
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file: Option<PathBuf>,

  /// Log rotation: daily, hourly, never (default: daily)
  pub rotation: String,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      file: None,
      rotation: "daily".to_string(),
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub remote: RemoteConfig,
  pub search: SearchConfig,
  pub suggest: SuggestConfig,
  pub logging: LoggingConfig,
}

impl Config {
  /// Load configuration.
  ///
  /// An explicit path must exist and parse. Implicit locations fall back to
  /// defaults when missing or broken.
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::load_from(path);
    }

    let candidates = crate::dirs::env_config_path()
      .into_iter()
      .chain(std::iter::once(crate::dirs::user_config_path()));

    for path in candidates {
      if !path.exists() {
        continue;
      }
      match Self::load_from(&path) {
        Ok(config) => {
          debug!(path = %path.display(), "Loaded config");
          return Ok(config);
        }
        Err(e) => warn!(error = %e, "Ignoring unusable config file"),
      }
    }

    Ok(Self::default())
  }

  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Page size the controller starts with, already bounded by the maximum.
  pub fn initial_page_size(&self) -> u32 {
    self.search.default_page_size.clamp(1, self.max_page_size())
  }

  pub fn max_page_size(&self) -> u32 {
    self.search.max_page_size.max(1)
  }

  /// Generate a commented config template
  pub fn generate_template() -> String {
    let defaults = Self::default();
    format!(
      r#"# quarry configuration
# Place in ~/.config/quarry/config.toml or point QUARRY_CONFIG at it

[remote]
# Base URL of the search service API
base_url = "{base_url}"
# Bearer token (falls back to the QUARRY_API_KEY environment variable)
# api_key = ""
# Per-request timeout in milliseconds
timeout_ms = {timeout_ms}

[search]
# Page size used until the user picks another
default_page_size = {default_page_size}
# Upper bound for any page size
max_page_size = {max_page_size}
# Ask the service for facet counts alongside results
include_facets = {include_facets}
# Cached outcomes kept per controller (0 disables caching)
cache_capacity = {cache_capacity}
# Seconds a cached outcome stays valid
cache_ttl_secs = {cache_ttl_secs}

[suggest]
# Minimum characters before suggestions are requested
min_chars = {min_chars}
# Quiet period after the last keystroke (milliseconds)
debounce_ms = {debounce_ms}
# Maximum suggestions requested
limit = {limit}
# Suggestion sources: query, title, tag, author
types = ["query", "title", "tag"]

[logging]
# off, error, warn, info, debug, trace
level = "{level}"
# Write logs to a file instead of stderr
# file = "/var/log/quarry.log"
# daily, hourly, never
rotation = "{rotation}"
"#,
      base_url = defaults.remote.base_url,
      timeout_ms = defaults.remote.timeout_ms,
      default_page_size = defaults.search.default_page_size,
      max_page_size = defaults.search.max_page_size,
      include_facets = defaults.search.include_facets,
      cache_capacity = defaults.search.cache_capacity,
      cache_ttl_secs = defaults.search.cache_ttl_secs,
      min_chars = defaults.suggest.min_chars,
      debounce_ms = defaults.suggest.debounce_ms,
      limit = defaults.suggest.limit,
      level = defaults.logging.level,
      rotation = defaults.logging.rotation,
    )
  }
}
