//! EventDispatcher: synchronous dispatch, subscription at any time.

use std::sync::{Arc, RwLock};

use crossbeam_channel::{Receiver, Sender};

use super::handler::RibbitEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// Handlers may be added while a scan is running; they see only the events
/// emitted after they were added. There is no replay buffer.
pub struct EventDispatcher {
    handlers: RwLock<Vec<Arc<dyn RibbitEventHandler>>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register an event handler.
    pub fn subscribe(&self, handler: Arc<dyn RibbitEventHandler>) {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.push(handler);
    }

    /// Subscribe to progress events as a channel.
    ///
    /// The sender side is dropped from the dispatcher's point of view once the
    /// receiver goes away; sends to a closed channel are ignored.
    pub fn subscribe_progress(&self) -> Receiver<ScanProgressEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribe(Arc::new(ProgressChannel { tx }));
        rx
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.read().map(|h| h.len()).unwrap_or(0)
    }

    /// Emit an event to all registered handlers.
    /// Handlers that panic are caught and do not prevent subsequent handlers
    /// from receiving the event.
    fn emit<F: Fn(&dyn RibbitEventHandler)>(&self, f: F) {
        // Snapshot so a handler may subscribe from inside a callback.
        let handlers: Vec<Arc<dyn RibbitEventHandler>> = match self.handlers.read() {
            Ok(h) => h.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for handler in &handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked; continuing with remaining handlers");
            }
        }
    }

    // ---- Scan Lifecycle ----
    pub fn emit_scan_started(&self, event: &ScanStartedEvent) {
        self.emit(|h| h.on_scan_started(event));
    }

    pub fn emit_phase_started(&self, event: &PhaseStartedEvent) {
        self.emit(|h| h.on_phase_started(event));
    }

    pub fn emit_scan_progress(&self, event: &ScanProgressEvent) {
        self.emit(|h| h.on_scan_progress(event));
    }

    pub fn emit_file_skipped(&self, event: &FileSkippedEvent) {
        self.emit(|h| h.on_file_skipped(event));
    }

    pub fn emit_scan_complete(&self, event: &ScanCompleteEvent) {
        self.emit(|h| h.on_scan_complete(event));
    }

    pub fn emit_scan_error(&self, event: &ScanErrorEvent) {
        self.emit(|h| h.on_scan_error(event));
    }

    // ---- Errors ----
    pub fn emit_error(&self, event: &ErrorEvent) {
        self.emit(|h| h.on_error(event));
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards progress events into a channel.
struct ProgressChannel {
    tx: Sender<ScanProgressEvent>,
}

impl RibbitEventHandler for ProgressChannel {
    fn on_scan_progress(&self, event: &ScanProgressEvent) {
        let _ = self.tx.send(event.clone());
    }
}
