//! Configuration file loading.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use dirs_next::{config_dir, home_dir};
use tracing::debug;

use super::{StitchConfig, validate_config};

pub const CONFIG_PATH_ENV_VAR: &str = "STITCH_CONFIG_PATH";
pub const API_BASE_ENV_VAR: &str = "STITCH_API_BASE";

/// Returns the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("stitch").join("config.json")
}

/// Loads configuration from the default path.
pub fn load_config() -> Result<StitchConfig> {
    load_config_from_path(&default_config_path())
}

/// Loads configuration from a specific path.
///
/// A missing file yields the defaults. `.yaml`/`.yml` files are read as YAML,
/// everything else as JSON. `STITCH_API_BASE` overrides `api.base_url`.
pub fn load_config_from_path(path: &Path) -> Result<StitchConfig> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&content, path)?
    } else {
        debug!(path = %path.display(), "config file not found, using defaults");
        StitchConfig::default()
    };

    if let Ok(base_url) = env::var(API_BASE_ENV_VAR)
        && !base_url.trim().is_empty()
    {
        config.api.base_url = base_url.trim().to_string();
    }

    validate_config(&config).with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

fn parse_config(content: &str, path: &Path) -> Result<StitchConfig> {
    let is_yaml = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(content).with_context(|| format!("Failed to parse YAML config: {}", path.display()))
    } else {
        serde_json::from_str(content).with_context(|| format!("Failed to parse JSON config: {}", path.display()))
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}
