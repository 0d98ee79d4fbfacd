pub mod compare;
pub mod config;
pub mod fetch;
pub mod push;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pbxmig_core::{config as core_config, MigrationConfig};

/// `--config` if given, else `~/.pbxmig/config.yaml`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
    Ok(core_config::config_path_at(&home))
}

/// Load the config and overlay passwords from the environment.
pub fn load_config(explicit: Option<&Path>) -> Result<MigrationConfig> {
    let path = config_path(explicit)?;
    let mut config = core_config::load_at(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    config.apply_secret_overrides(|key| std::env::var(key).ok());
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}
