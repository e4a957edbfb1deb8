//! CLI configuration layering.
//!
//! Precedence, highest first: command line flags, environment variables
//! (including a `.env` file), the JSON config file (`~/.alldebrid` unless
//! `--config` is given).

use alldebrid::ClientOptions;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".alldebrid";

/// Contents of the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

/// Values coming from flags and environment variables.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}

/// Load the config file.
///
/// An explicit path must exist and parse. The default path is optional and
/// a broken default file is ignored with a warning.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return read_file_config(path);
    }
    let Some(path) = default_config_path() else {
        return Ok(FileConfig::default());
    };
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    match read_file_config(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!("ignoring config file {}: {:#}", path.display(), e);
            Ok(FileConfig::default())
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

/// Merge both layers into client options.
pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<ClientOptions> {
    let api_key = overrides
        .api_key
        .or(file.api_key)
        .filter(|key| !key.trim().is_empty());
    let Some(api_key) = api_key else {
        bail!(
            "API key required. Pass --api-key, set ALLDEBRID_API_KEY or create a ~/{CONFIG_FILE_NAME} config file."
        );
    };

    let mut options = ClientOptions::new(api_key);
    options.base_url = overrides.base_url.or(file.base_url);
    options.timeout_ms = overrides.timeout_ms.or(file.timeout_ms);
    options.max_retries = overrides.max_retries.or(file.max_retries);
    Ok(options)
}
