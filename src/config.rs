//! Configuration Management
//!
//! Persistent settings for the `vultr` binary, stored as JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted for the API token
pub const TOKEN_ENV: &str = "VULTR_API_KEY";

pub const DEFAULT_LOG_PREFIX: &str = "vultr";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Directory for the log file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Log file name without extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_prefix: Option<String>,
    /// One of off, error, warn, info, debug, trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// `<config_dir>/vultr/config.json`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vultr").join("config.json"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::try_load().unwrap_or_default()
    }

    /// Load from the default location
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an error.
    pub fn try_load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Token precedence: CLI flag > environment > config file
    pub fn effective_token(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string)
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
            .or_else(|| self.api_token.clone())
            .filter(|t| !t.is_empty())
    }

    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn effective_log_prefix(&self) -> &str {
        self.log_prefix.as_deref().unwrap_or(DEFAULT_LOG_PREFIX)
    }

    /// `<log_dir>/<log_prefix>.log`
    pub fn log_path(&self) -> PathBuf {
        self.effective_log_dir()
            .join(format!("{}.log", self.effective_log_prefix()))
    }
}
