//! Configuration errors.

use std::path::PathBuf;

use super::error_code::{self, RibbitErrorCode};

/// Errors raised while loading or checking a [`crate::config::RibbitConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("extraction.traversal_limit must be at least 1 (got {value})")]
    TraversalLimit { value: usize },

    #[error("scan.threads must be at most {max} (got {value})")]
    ThreadCount { value: usize, max: usize },

    #[error("scan.max_file_size must be greater than 0")]
    ZeroFileSizeLimit,

    #[error("scan.extensions entry {extension:?} must be non-empty and have no leading dot")]
    Extension { extension: String },

    #[error("Cannot serialize config: {message}")]
    Serialize { message: String },
}

impl ConfigError {
    /// The config key a validation failure is about.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::TraversalLimit { .. } => Some("extraction.traversal_limit"),
            Self::ThreadCount { .. } => Some("scan.threads"),
            Self::ZeroFileSizeLimit => Some("scan.max_file_size"),
            Self::Extension { .. } => Some("scan.extensions"),
            Self::Unreadable { .. } | Self::Malformed { .. } | Self::Serialize { .. } => None,
        }
    }
}

impl RibbitErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
