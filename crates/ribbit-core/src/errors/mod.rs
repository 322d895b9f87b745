//! Error handling for Ribbit.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod extraction_error;
pub mod parse_error;
pub mod pipeline_error;
pub mod scan_error;

pub use config_error::ConfigError;
pub use error_code::RibbitErrorCode;
pub use extraction_error::ExtractionError;
pub use parse_error::ParseError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use scan_error::ScanError;
