//! core::config::schema
//!
//! Configuration file schema.
//!
//! Unknown fields are rejected so typos in hand-edited files surface as
//! errors instead of silently doing nothing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// User-level settings, all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Default masterlist path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masterlist: Option<PathBuf>,

    /// Default userlist path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userlist: Option<PathBuf>,

    /// Default data directory to evaluate conditions against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Masterlist distribution settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSettings>,
}

/// Where masterlist updates come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteSettings {
    /// Repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Branch to track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Settings {
    /// Validate loaded settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(remote) = &self.remote {
            if let Some(url) = &remote.url {
                if url.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "remote.url cannot be empty".into(),
                    ));
                }
            }
            if let Some(branch) = &remote.branch {
                if branch.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "remote.branch cannot be empty".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}
