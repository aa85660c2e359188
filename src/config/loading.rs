//! Configuration loading functionality.
//!
//! Locates the configuration file, parses it and runs validation. There is
//! no default-config generation: coordinates and a ping target cannot be
//! guessed, so a missing file is an error.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use super::validation::validate_config;
use crate::constants::*;
use crate::utils::private_path;

/// Candidate paths in search order, excluding an explicit `--config` path.
fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    candidates
}

/// Resolve which configuration file to use.
pub fn find_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let candidates = default_candidates();
    if let Some(found) = candidates.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let searched = candidates
        .iter()
        .map(|path| private_path(path))
        .collect::<Vec<_>>()
        .join(", ");
    anyhow::bail!("No configuration file found (searched: {searched})")
}

/// Load configuration using the search order, or the explicit path if given.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = find_config_path(explicit)?;
    load_from_path(&path)
}

/// Load and validate configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found at specified path: {}",
            private_path(path)
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    validate_config(&config)
        .with_context(|| format!("Invalid configuration in {}", private_path(path)))?;

    Ok(config)
}
