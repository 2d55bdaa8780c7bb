use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::algorithm::HashAlgorithm;
use crate::enumerate::DEFAULT_EXTENSION;
use crate::hasher::DEFAULT_CHUNK_SIZE;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per file (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 0.25,
            max_delay_secs: 10,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/isosum/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsosumConfig {
    /// File extension to hash (with or without the leading dot).
    pub extension: String,
    /// Read chunk size in bytes.
    pub chunk_size: usize,
    /// Checksum algorithm: "blake2b", "blake2b-256" or "sha256".
    pub algorithm: HashAlgorithm,
    /// Maximum number of files hashed at once (None = no explicit cap).
    #[serde(default)]
    pub max_concurrent: Option<usize>,
    /// Optional retry policy; if missing, files are attempted once.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional log file; logs go to stderr when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for IsosumConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            algorithm: HashAlgorithm::default(),
            max_concurrent: None,
            retry: None,
            log_file: None,
        }
    }
}

impl IsosumConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("isosum")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path`.
pub fn load_from(path: &Path) -> Result<IsosumConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: IsosumConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from `path`, writing a default file there if none exists.
pub fn load_or_init_at(path: &Path) -> Result<IsosumConfig> {
    if !path.exists() {
        let default_cfg = IsosumConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(path)
}

/// Load configuration from the XDG config dir, creating a default file if none exists.
pub fn load_or_init() -> Result<IsosumConfig> {
    load_or_init_at(&config_path()?)
}
