//! Scanner errors. These are the only scan-fatal errors.

use std::path::PathBuf;

use super::error_code::{self, RibbitErrorCode};

/// Errors that abort a whole scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan root does not exist or is not a directory: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("Scan root is not readable: {path}: {source}")]
    UnreadableRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid ignore pattern {pattern}: {message}")]
    InvalidIgnorePattern { pattern: String, message: String },

    #[error("Failed to build worker pool: {message}")]
    WorkerPool { message: String },

    #[error("Scan cancelled")]
    Cancelled,
}

impl RibbitErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRoot { .. } | Self::UnreadableRoot { .. } => error_code::INVALID_ROOT,
            Self::Cancelled => error_code::CANCELLED,
            Self::InvalidIgnorePattern { .. } | Self::WorkerPool { .. } => error_code::SCAN_ERROR,
        }
    }
}
