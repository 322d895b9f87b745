//! Scan orchestration: discovery, the three extraction phases, linking and
//! layout, plus the session holding the latest completed scan.

pub mod orchestrator;
mod progress;
pub mod session;
pub mod types;

pub use orchestrator::ScanPipeline;
pub use session::RibbitSession;
pub use types::{ScanOutcome, ScanStats};
