//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/bookmarks/config.toml)
//! 3. Environment variables (BOOKMARKS_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConflictStatus;
use crate::store::DATABASE_FILE;

/// Environment variable prefix
const ENV_PREFIX: &str = "BOOKMARKS";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the SQLite store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Upper bound for a single title fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// How constraint violations are reported to callers
    #[serde(default)]
    pub conflict_status: ConflictStatus,

    /// Log file (logs go to stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            conflict_status: ConflictStatus::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (BOOKMARKS_DATA_DIR, BOOKMARKS_FETCH_TIMEOUT,
    ///    BOOKMARKS_CONFLICT_STATUS)
    /// 2. Config file (~/.config/bookmarks/config.toml or BOOKMARKS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // DATA_DIR is what older deployments set
        if let Ok(val) = std::env::var("DATA_DIR") {
            if !val.is_empty() {
                self.data_dir = PathBuf::from(val);
            }
        }

        // BOOKMARKS_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            if !val.is_empty() {
                self.data_dir = PathBuf::from(val);
            }
        }

        // BOOKMARKS_FETCH_TIMEOUT
        if let Ok(val) = std::env::var(format!("{}_FETCH_TIMEOUT", ENV_PREFIX)) {
            if let Ok(secs) = val.trim().parse() {
                self.fetch_timeout_secs = secs;
            }
        }

        // BOOKMARKS_CONFLICT_STATUS
        if let Ok(val) = std::env::var(format!("{}_CONFLICT_STATUS", ENV_PREFIX)) {
            if let Ok(status) = val.parse() {
                self.conflict_status = status;
            }
        }
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with BOOKMARKS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bookmarks")
            .join("config.toml")
    }

    /// Get the path to the SQLite store
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Title fetch timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// The data directory defaults to `./data`, relative to the working directory
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_fetch_timeout_secs() -> u64 {
    10
}
