//! Pipeline errors and non-fatal error collection.

use super::error_code::RibbitErrorCode;
use super::{ExtractionError, ParseError, ScanError};

/// Any error a scan reports, fatal or collected per file.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

impl RibbitErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Scan(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Extraction(e) => e.error_code(),
        }
    }
}

/// A scan's data plus every per-file failure it survived.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    pub data: T,
    /// Failures that cost a file, never the scan.
    pub errors: Vec<PipelineError>,
}

impl<T: Default> PipelineResult<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: impl Into<PipelineError>) {
        self.errors.push(error.into());
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Transform the data, keeping the collected errors.
    pub fn map<U: Default>(self, f: impl FnOnce(T) -> U) -> PipelineResult<U> {
        PipelineResult {
            data: f(self.data),
            errors: self.errors,
        }
    }

    /// Collected errors carrying `code`.
    pub fn errors_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a PipelineError> + 'a {
        self.errors.iter().filter(move |e| e.error_code() == code)
    }
}
