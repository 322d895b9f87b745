//! RibbitEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for handling Ribbit events.
///
/// Handlers only override the events they care about. `Send + Sync` is
/// required because a scan emits from its reducer thread.
pub trait RibbitEventHandler: Send + Sync {
    // ---- Scan Lifecycle ----
    fn on_scan_started(&self, _event: &ScanStartedEvent) {}
    fn on_phase_started(&self, _event: &PhaseStartedEvent) {}
    fn on_scan_progress(&self, _event: &ScanProgressEvent) {}
    fn on_file_skipped(&self, _event: &FileSkippedEvent) {}
    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {}
    fn on_scan_error(&self, _event: &ScanErrorEvent) {}

    // ---- Errors ----
    fn on_error(&self, _event: &ErrorEvent) {}
}
