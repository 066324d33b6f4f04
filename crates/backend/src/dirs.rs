//! Filesystem locations used by quarry.

use std::path::PathBuf;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "QUARRY_CONFIG";

/// Get the default config directory
///
/// Respects the following environment variables (in order of precedence):
/// 1. XDG_CONFIG_HOME - standard XDG config home directory
/// 2. dirs::config_dir() - platform default
pub fn default_config_dir() -> PathBuf {
  if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
    return PathBuf::from(xdg_config).join("quarry");
  }

  dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("quarry")
}

/// Path of the user-level config file.
pub fn user_config_path() -> PathBuf {
  default_config_dir().join("config.toml")
}

/// Config file named by `QUARRY_CONFIG`, if set and non-empty.
pub fn env_config_path() -> Option<PathBuf> {
  std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty()).map(PathBuf::from)
}
