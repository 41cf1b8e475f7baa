//! Configuration module for CSE-Proxy
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid upstream url '{0}': {1}")]
    InvalidUrl(String, String),
    #[error("invalid request timeout: {0}")]
    InvalidTimeout(f64),
    #[error("invalid cache-control value: {0:?}")]
    InvalidCacheControl(String),
}

/// Load settings from the first settings file found, then overlay the environment.
///
/// An explicit path must exist; the default locations are optional. Returns the
/// file that was used, if any.
pub fn load(explicit: Option<&Path>) -> Result<(Settings, Option<PathBuf>), ConfigError> {
    let path = locate(explicit)?;
    let mut settings = match path {
        Some(ref path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.merge_env();
    Ok((settings, path))
}

fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(path) = std::env::var("CSE_PROXY_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let mut candidates = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/cse-proxy/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("cse-proxy/settings.yml"));
    }

    Ok(candidates.into_iter().find(|p| p.exists()))
}
