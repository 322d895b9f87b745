//! Per-file parse errors. Never fatal to a scan.

use std::path::PathBuf;

use super::error_code::{self, RibbitErrorCode};

/// Errors that can occur while turning one file into a declaration tree.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Grammar could not be loaded: {message}")]
    Grammar { message: String },

    #[error("Tree-sitter error parsing {path}: {message}")]
    TreeSitter { path: PathBuf, message: String },

    #[error("{path} has {error_count} syntax error(s)")]
    Syntax { path: PathBuf, error_count: u32 },

    #[error("File name does not follow the {convention} convention: {path}")]
    MalformedFileName { path: PathBuf, convention: String },
}

impl RibbitErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedFileName { .. } => error_code::MALFORMED_FILE_NAME,
            _ => error_code::PARSE_ERROR,
        }
    }
}
