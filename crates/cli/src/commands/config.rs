//! Config commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use quarry::{Config, dirs};

/// The file `Config::load` would read, if any
fn active_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
  if let Some(path) = explicit {
    return Some(path.to_path_buf());
  }
  dirs::env_config_path()
    .into_iter()
    .chain(std::iter::once(dirs::user_config_path()))
    .find(|p| p.exists())
}

/// Show the effective configuration
pub fn cmd_config_show(config: &Config, explicit: Option<&Path>) -> Result<()> {
  match active_config_path(explicit) {
    Some(path) => println!("Using config: {}", path.display()),
    None => println!("Using default configuration (no config file found)"),
  }
  println!();

  let toml_str = toml::to_string_pretty(config).context("Failed to render config")?;
  println!("{}", toml_str);
  Ok(())
}

/// Write the config template
pub fn cmd_config_init(explicit: Option<&Path>, force: bool) -> Result<()> {
  let path = explicit
    .map(Path::to_path_buf)
    .or_else(dirs::env_config_path)
    .unwrap_or_else(dirs::user_config_path);

  if path.exists() && !force {
    bail!("Config file already exists: {} (use --force to overwrite)", path.display());
  }
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  std::fs::write(&path, Config::generate_template()).with_context(|| format!("Failed to write {}", path.display()))?;

  println!("Created config: {}", path.display());
  println!("Edit the file to point quarry at your search service.");
  Ok(())
}

/// Print the config path in use
pub fn cmd_config_path(explicit: Option<&Path>) -> Result<()> {
  match active_config_path(explicit) {
    Some(path) => println!("{}", path.display()),
    None => println!("{} (not created yet)", dirs::user_config_path().display()),
  }
  Ok(())
}
