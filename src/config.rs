//! TOML configuration for the client process.
//!
//! The three user-facing settings (endpoints and model) are not here: they
//! live in persistent storage and are edited through [`crate::settings`].
//! This file only carries process-level knobs: where storage lives and the
//! fixed delays used by the upload pipeline and the notifier.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/askcorp.sqlite")
}

/// Fixed delays, in milliseconds.
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Delay between a successful transfer and the record being marked indexed.
    #[serde(default = "default_index_delay_ms")]
    pub index_delay_ms: u64,
    /// Delay before the progress indicator is hidden after each file.
    #[serde(default = "default_progress_hide_ms")]
    pub progress_hide_ms: u64,
    /// How long a toast stays fully visible.
    #[serde(default = "default_toast_display_ms")]
    pub toast_display_ms: u64,
    /// Length of the toast exit phase before removal.
    #[serde(default = "default_toast_exit_ms")]
    pub toast_exit_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            index_delay_ms: default_index_delay_ms(),
            progress_hide_ms: default_progress_hide_ms(),
            toast_display_ms: default_toast_display_ms(),
            toast_exit_ms: default_toast_exit_ms(),
        }
    }
}

fn default_index_delay_ms() -> u64 {
    5000
}
fn default_progress_hide_ms() -> u64 {
    1000
}
fn default_toast_display_ms() -> u64 {
    3000
}
fn default_toast_exit_ms() -> u64 {
    300
}

impl TimingConfig {
    pub fn index_delay(&self) -> Duration {
        Duration::from_millis(self.index_delay_ms)
    }

    pub fn progress_hide(&self) -> Duration {
        Duration::from_millis(self.progress_hide_ms)
    }

    pub fn toast_display(&self) -> Duration {
        Duration::from_millis(self.toast_display_ms)
    }

    pub fn toast_exit(&self) -> Duration {
        Duration::from_millis(self.toast_exit_ms)
    }
}

/// Load configuration from `path`.
///
/// A missing file is not an error: the built-in defaults are used so a fresh
/// checkout works without any setup. A file that exists but fails to parse
/// or validate is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.storage.path.as_os_str().is_empty() {
        anyhow::bail!("storage.path must not be empty");
    }

    if config.timing.toast_display_ms == 0 {
        anyhow::bail!("timing.toast_display_ms must be > 0");
    }

    Ok(config)
}
