//! Configuration loading.
//!
//! Quickchat reads an optional `config.toml`. Every section has defaults, so
//! an empty or missing file is valid. Relative paths are resolved against the
//! directory holding the config file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::store::DEFAULT_STORE_FILE;

/// Config file name inside [`config_dir`].
pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Durable message store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Durable message store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the line-delimited store file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rotated JSON log files.
    #[serde(default = "default_logs_dir")]
    pub dir: PathBuf,

    /// Filter directive used when `RUST_LOG` is unset, e.g. `"debug"` or
    /// `"quickchat=trace,warn"`. Unset means `info` for file logging and
    /// `warn` on the console.
    #[serde(default)]
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logs_dir(),
            level: None,
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_FILE)
}
fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Config {
    /// Make relative store and log paths absolute against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.store.path.is_relative() {
            self.store.path = base.join(&self.store.path);
        }
        if self.logging.dir.is_relative() {
            self.logging.dir = base.join(&self.logging.dir);
        }
    }
}

/// Load config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let mut config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    config.resolve_paths(parent_dir(path));
    Ok(config)
}

/// Load config from `path`, falling back to defaults when it does not exist.
///
/// Default paths are resolved against the directory `path` would live in.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    tracing::debug!(path = %path.display(), "no config file found, using defaults");
    let mut config = Config::default();
    config.resolve_paths(parent_dir(path));
    Ok(config)
}

/// Resolve the default config directory (`~/.quickchat/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".quickchat"))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}
