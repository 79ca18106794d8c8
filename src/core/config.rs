//! Layered configuration
//!
//! Values are read, lowest priority first, from:
//! 1. the user config file (`$XDG_CONFIG_HOME/yardbook/config.yaml` or the
//!    platform equivalent, overridable with `YARDBOOK_CONFIG`)
//! 2. the collection's `.yardbook/config.yaml`
//! 3. environment variables (`YARDBOOK_AUTHOR`, `YARDBOOK_EDITOR`,
//!    `YARDBOOK_CURRENCY`, `YARDBOOK_GAUGE`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::collection::Collection;
use crate::entities::Currency;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<Currency>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_gauge: Option<String>,
}

impl Config {
    /// Load configuration for the collection containing the current
    /// directory (if any)
    pub fn load() -> Self {
        let collection = Collection::discover().ok();
        Self::load_for(collection.as_ref())
    }

    /// Load configuration for a specific collection
    ///
    /// Unreadable files are logged and skipped.
    pub fn load_for(collection: Option<&Collection>) -> Self {
        let mut config = Config::default();

        let mut files: Vec<PathBuf> = Vec::new();
        if let Some(path) = Self::user_config_path() {
            files.push(path);
        }
        if let Some(collection) = collection {
            files.push(collection.config_path());
        }

        for path in files.iter().filter(|p| p.is_file()) {
            match Self::read_file(path) {
                Ok(layer) => {
                    tracing::debug!(path = %path.display(), "loaded config layer");
                    config.merge(layer);
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }

        config.merge(Self::from_env());
        config
    }

    /// Read a single config file
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            return Ok(Config::default());
        }
        serde_yml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Location of the user-wide config file
    pub fn user_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("YARDBOOK_CONFIG") {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("", "", "yardbook")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            author: var("YARDBOOK_AUTHOR"),
            editor: var("YARDBOOK_EDITOR"),
            default_currency: var("YARDBOOK_CURRENCY").and_then(|c| match c.parse() {
                Ok(currency) => Some(currency),
                Err(e) => {
                    tracing::warn!("ignoring YARDBOOK_CURRENCY: {}", e);
                    None
                }
            }),
            default_gauge: var("YARDBOOK_GAUGE"),
        }
    }

    /// Overlay the values set in `other`
    pub fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.default_currency.is_some() {
            self.default_currency = other.default_currency;
        }
        if other.default_gauge.is_some() {
            self.default_gauge = other.default_gauge;
        }
    }

    /// Author name for new records
    pub fn author(&self) -> String {
        self.author
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Editor command for `edit` subcommands
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    pub fn currency(&self) -> Currency {
        self.default_currency.unwrap_or_default()
    }
}
