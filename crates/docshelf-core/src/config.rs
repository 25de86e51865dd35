//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/docshelf/config.toml)
//! 3. Environment variables (DOCSHELF_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "DOCSHELF";

/// Default sidebar title
pub const DEFAULT_TITLE: &str = "Basic Data Engineering Journey";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db, logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite database file (defaults to {data_dir}/docshelf.db)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// How long a statement waits on a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Directory of *.html templates (built-in templates when unset)
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// CSS file inlined into pages opened in the browser
    #[serde(default)]
    pub stylesheet: Option<PathBuf>,

    /// Catalog seed used when the database is unreachable
    #[serde(default)]
    pub catalog_file: Option<PathBuf>,

    /// Sidebar title
    #[serde(default = "default_title")]
    pub title: String,

    /// Log file for TUI mode (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            template_dir: None,
            stylesheet: None,
            catalog_file: None,
            title: default_title(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (DOCSHELF_DATA_DIR, DOCSHELF_DATABASE, ...)
    /// 2. Config file (~/.config/docshelf/config.toml or DOCSHELF_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit `--config` path
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
        config.ensure_data_dir()?;
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
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_DATABASE", ENV_PREFIX)) {
            self.database_path = non_empty_path(val);
        }

        if let Ok(val) = std::env::var(format!("{}_TEMPLATE_DIR", ENV_PREFIX)) {
            self.template_dir = non_empty_path(val);
        }

        if let Ok(val) = std::env::var(format!("{}_CATALOG_FILE", ENV_PREFIX)) {
            self.catalog_file = non_empty_path(val);
        }

        if let Ok(val) = std::env::var(format!("{}_BUSY_TIMEOUT_MS", ENV_PREFIX)) {
            match val.parse() {
                Ok(ms) => self.busy_timeout_ms = ms,
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid DOCSHELF_BUSY_TIMEOUT_MS"),
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
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
    /// Can be overridden with DOCSHELF_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docshelf")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("docshelf.db"))
    }

    /// Get the path to the TUI log file
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

fn non_empty_path(val: String) -> Option<PathBuf> {
    if val.is_empty() {
        None
    } else {
        Some(PathBuf::from(val))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docshelf")
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
