//! Builder configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "lessonkit.config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Page-builder configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    /// Enabling `shakeOnWrong` also switches `allowRetry` off.
    pub couple_shake_with_retry: bool,
    /// Directory for file storage; the platform data dir when unset.
    pub storage_dir: Option<PathBuf>,
    /// Pretty-print saved documents.
    pub pretty_json: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            couple_shake_with_retry: false,
            storage_dir: None,
            pretty_json: true,
        }
    }
}

impl BuilderConfig {
    /// Load config from a directory, falling back to defaults when the file
    /// does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(DEFAULT_CONFIG_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
