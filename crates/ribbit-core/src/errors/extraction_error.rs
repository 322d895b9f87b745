//! Extraction errors raised while attaching companion facts to modules.

use std::path::PathBuf;

use super::error_code::{self, RibbitErrorCode};

/// A file parsed fine but its facts could not be attached to the module set.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("No dependency protocol found for non-core component {component} in {path}")]
    MissingDependency { component: String, path: PathBuf },

    #[error("No module declares non-core component {component} ({path})")]
    UnmatchedNonCore { component: String, path: PathBuf },
}

impl RibbitErrorCode for ExtractionError {
    fn error_code(&self) -> &'static str {
        error_code::EXTRACTION_ERROR
    }
}
