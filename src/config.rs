//! Loader configuration
//!
//! A `LoaderConfig` is read-only input to every resolution pass. It is
//! deserialized from JSON with per-field defaults, optionally overridden from
//! the command line, and validated once when the engine is built.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::core::file_reader::DEFAULT_MAX_FILE_SIZE;

/// Default per-item time budget in milliseconds
pub const DEFAULT_ITEM_TIMEOUT_MS: u64 = 5_000;

/// Default number of mentions resolved/loaded at once
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Configuration failures; the only errors a caller ever sees
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported resolve_relative_to '{0}' (expected 'cwd' or 'git_root')")]
    UnknownAnchorMode(String),

    #[error("max_file_size must be a positive number of bytes")]
    InvalidMaxFileSize,

    #[error("invalid extension '{0}': must be non-empty and contain no path separator")]
    InvalidExtension(String),

    #[error("max_concurrency must be between 1 and {}", Semaphore::MAX_PERMITS)]
    InvalidConcurrency,

    #[error("item_timeout_ms must be at least 1")]
    InvalidTimeout,
}

/// Base directory strategy for resolving mentions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// Resolve against the working directory
    #[default]
    Cwd,
    /// Resolve against the enclosing repository root, falling back to the working directory
    GitRoot,
}

impl FromStr for AnchorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cwd" => Ok(AnchorMode::Cwd),
            "git_root" | "git-root" => Ok(AnchorMode::GitRoot),
            _ => Err(ConfigError::UnknownAnchorMode(s.to_string())),
        }
    }
}

impl fmt::Display for AnchorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorMode::Cwd => write!(f, "cwd"),
            AnchorMode::GitRoot => write!(f, "git_root"),
        }
    }
}

/// Configuration for mention resolution and loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub resolve_relative_to: AnchorMode,

    /// Extensions tried in order when a mention has none
    #[serde(default = "default_extensions")]
    pub try_extensions: Vec<String>,

    /// Files larger than this many bytes are skipped unread
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Consumed by the presentation layer only
    #[serde(default = "default_true")]
    pub show_loaded_files: bool,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_item_timeout_ms")]
    pub item_timeout_ms: u64,

    /// Directory resolution starts from; the process working directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

fn default_extensions() -> Vec<String> {
    vec![".md".to_string(), ".txt".to_string(), ".py".to_string()]
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_true() -> bool {
    true
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_item_timeout_ms() -> u64 {
    DEFAULT_ITEM_TIMEOUT_MS
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            resolve_relative_to: AnchorMode::default(),
            try_extensions: default_extensions(),
            max_file_size: default_max_file_size(),
            show_loaded_files: true,
            max_concurrency: default_max_concurrency(),
            item_timeout_ms: default_item_timeout_ms(),
            base_dir: None,
        }
    }
}

impl LoaderConfig {
    /// Parse a JSON config document; absent keys take their defaults
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Check every constraint the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size == 0 {
            return Err(ConfigError::InvalidMaxFileSize);
        }

        if let Some(bad) = self
            .try_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains('/') || ext.contains('\\'))
        {
            return Err(ConfigError::InvalidExtension(bad.clone()));
        }

        if self.max_concurrency == 0 || self.max_concurrency > Semaphore::MAX_PERMITS {
            return Err(ConfigError::InvalidConcurrency);
        }

        if self.item_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    pub fn item_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.item_timeout_ms)
    }
}
