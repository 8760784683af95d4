//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$METALIST_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/metalist/config.toml`
//! 3. `~/.metalist/config.toml` (canonical write location)
//!
//! Missing files are not an error; defaults apply. CLI flags always take
//! precedence over configured values (handled in the CLI layer).
//!
//! # Example
//!
//! ```no_run
//! use metalist::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("branch: {}", config.branch());
//! ```

pub mod schema;

pub use schema::{RemoteSettings, Settings};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with accessor defaults applied.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings.
    pub settings: Settings,
    /// Path the settings were loaded from, if any.
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    /// A missing file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        // 1. Check $METALIST_CONFIG
        if let Ok(path) = std::env::var("METALIST_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let settings = Self::read_settings(&path)?;
                return Ok(Self {
                    settings,
                    loaded_from: Some(path),
                });
            }
        }

        // 2. Check $XDG_CONFIG_HOME/metalist/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("metalist/config.toml");
            if path.exists() {
                let settings = Self::read_settings(&path)?;
                return Ok(Self {
                    settings,
                    loaded_from: Some(path),
                });
            }
        }

        // 3. Check ~/.metalist/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".metalist/config.toml");
            if path.exists() {
                let settings = Self::read_settings(&path)?;
                return Ok(Self {
                    settings,
                    loaded_from: Some(path),
                });
            }
        }

        Ok(Self::default())
    }

    fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Settings =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Get the canonical config path, `~/.metalist/config.toml`.
    pub fn canonical_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".metalist/config.toml"))
    }

    /// Write settings to the canonical path atomically.
    ///
    /// Creates parent directories if needed. Uses atomic write
    /// (write to temp file, then rename) to prevent corruption.
    pub fn write(settings: &Settings) -> Result<PathBuf, ConfigError> {
        let path = Self::canonical_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.clone(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &path).map_err(|e| ConfigError::WriteError {
            path: path.clone(),
            source: e,
        })?;

        Ok(path)
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Configured masterlist path, if any.
    pub fn masterlist(&self) -> Option<&Path> {
        self.settings.masterlist.as_deref()
    }

    /// Configured userlist path, if any.
    pub fn userlist(&self) -> Option<&Path> {
        self.settings.userlist.as_deref()
    }

    /// Configured data directory, if any.
    pub fn data_dir(&self) -> Option<&Path> {
        self.settings.data_dir.as_deref()
    }

    /// Configured remote URL, if any.
    pub fn remote_url(&self) -> Option<&str> {
        self.settings
            .remote
            .as_ref()
            .and_then(|r| r.url.as_deref())
    }

    /// Branch to track. Defaults to "main" if not configured.
    pub fn branch(&self) -> &str {
        self.settings
            .remote
            .as_ref()
            .and_then(|r| r.branch.as_deref())
            .unwrap_or("main")
    }

    /// Path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
