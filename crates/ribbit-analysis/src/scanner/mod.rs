//! Scanner subsystem: file discovery and naming-convention classification.
//!
//! Discovery is a single sorted walk so the file order, and everything
//! derived from it, is identical between runs over the same tree.

pub mod types;
pub mod walker;

pub use types::{DiscoveredFile, Discovery, DiscoveryStats, FileRole, SkipReason, SkippedFile};
pub use walker::discover;
