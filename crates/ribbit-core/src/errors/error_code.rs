//! RibbitErrorCode trait for boundary conversion.

/// Stable, machine-readable error codes.
///
/// Front ends (the CLI, an embedding UI) match on these instead of on
/// message text.
pub trait RibbitErrorCode {
    /// Returns the error code string (e.g., "SCAN_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the tagged form: `[ERROR_CODE] message`.
    fn tagged_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const INVALID_ROOT: &str = "INVALID_ROOT";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const MALFORMED_FILE_NAME: &str = "MALFORMED_FILE_NAME";
pub const EXTRACTION_ERROR: &str = "EXTRACTION_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CANCELLED: &str = "CANCELLED";
