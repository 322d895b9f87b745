//! Scan outcome types.

use std::path::PathBuf;

use serde::Serialize;

use crate::extraction::PluginPointFacts;
use crate::hierarchy::{Hierarchy, LevelLayout};

/// Counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    /// Matched a naming convention but were never parsed.
    pub files_skipped: usize,
    pub modules: usize,
    pub edges_linked: usize,
    pub references_unresolved: usize,
    pub references_ambiguous: usize,
    pub non_core_merged: usize,
    pub plugin_points: usize,
    pub discovery_ms: u64,
    pub duration_ms: u64,
}

/// Everything one completed scan produced. Immutable once returned.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub root: PathBuf,
    pub hierarchy: Hierarchy,
    pub layout: LevelLayout,
    /// Collected but not linked into the hierarchy.
    pub plugin_points: Vec<PluginPointFacts>,
    pub stats: ScanStats,
}
