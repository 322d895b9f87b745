//! Monotonic progress across all phases of one scan.

use std::path::Path;

use ribbit_core::events::types::ScanProgressEvent;
use ribbit_core::events::EventDispatcher;

/// Counts processed files against the pre-counted total. Owned by the
/// reducer, so `processed` only ever grows.
pub(super) struct ProgressTracker<'a> {
    events: &'a EventDispatcher,
    processed: usize,
    total: usize,
}

impl<'a> ProgressTracker<'a> {
    pub(super) fn new(events: &'a EventDispatcher, total: usize) -> Self {
        Self {
            events,
            processed: 0,
            total,
        }
    }

    pub(super) fn processed(&self) -> usize {
        self.processed
    }

    /// One more file finished, successfully or not.
    pub(super) fn advance(&mut self, file: &Path) {
        self.processed = (self.processed + 1).min(self.total);
        self.events.emit_scan_progress(&ScanProgressEvent {
            processed: self.processed,
            total: self.total,
            file: Some(file.to_path_buf()),
        });
    }

    /// Report completion of a scan with nothing to process.
    pub(super) fn finish_empty(&self) {
        self.events.emit_scan_progress(&ScanProgressEvent {
            processed: 0,
            total: 0,
            file: None,
        });
    }
}
