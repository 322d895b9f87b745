//! Event payload types.

use std::path::PathBuf;

/// The three strictly ordered extraction phases of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanPhase {
    /// `*Builder` files: module records.
    Modules,
    /// `*NonCoreComponent` files: companion facts merged into modules.
    NonCoreComponents,
    /// `*PluginPoint` files: plugin-point facts.
    PluginPoints,
}

impl ScanPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ScanPhase::Modules => "modules",
            ScanPhase::NonCoreComponents => "non_core_components",
            ScanPhase::PluginPoints => "plugin_points",
        }
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload for `on_scan_started`.
#[derive(Debug, Clone)]
pub struct ScanStartedEvent {
    pub root: PathBuf,
    pub file_count: usize,
}

/// Payload for `on_phase_started`.
#[derive(Debug, Clone)]
pub struct PhaseStartedEvent {
    pub phase: ScanPhase,
    pub file_count: usize,
}

/// Payload for `on_scan_progress`. One per processed file, across all phases.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanProgressEvent {
    pub processed: usize,
    pub total: usize,
    pub file: Option<PathBuf>,
}

impl ScanProgressEvent {
    /// Completed fraction in `0.0..=1.0`. An empty scan is complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.processed as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Payload for `on_file_skipped`.
#[derive(Debug, Clone)]
pub struct FileSkippedEvent {
    pub path: PathBuf,
    pub phase: ScanPhase,
    pub reason: String,
}

/// Payload for `on_scan_complete`.
#[derive(Debug, Clone)]
pub struct ScanCompleteEvent {
    pub modules: usize,
    pub levels: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub duration_ms: u64,
}

/// Payload for `on_scan_error`.
#[derive(Debug, Clone)]
pub struct ScanErrorEvent {
    pub message: String,
    pub error_code: String,
}

/// Payload for `on_error`.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub message: String,
    pub error_code: String,
}
