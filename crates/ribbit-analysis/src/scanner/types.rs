//! Scanner data types: FileRole, DiscoveredFile, Discovery.

use std::path::PathBuf;

use ribbit_core::events::types::ScanPhase;
use serde::Serialize;

/// Which naming convention a file matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileRole {
    /// `*Builder.<ext>`
    Builder,
    /// `*NonCoreComponent.<ext>`
    NonCoreComponent,
    /// `*PluginPoint.<ext>`
    PluginPoint,
}

impl FileRole {
    /// Suffixes are tried in this order.
    const MATCH_ORDER: [FileRole; 3] = [
        FileRole::PluginPoint,
        FileRole::NonCoreComponent,
        FileRole::Builder,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            FileRole::Builder => "Builder",
            FileRole::NonCoreComponent => "NonCoreComponent",
            FileRole::PluginPoint => "PluginPoint",
        }
    }

    pub fn phase(self) -> ScanPhase {
        match self {
            FileRole::Builder => ScanPhase::Modules,
            FileRole::NonCoreComponent => ScanPhase::NonCoreComponents,
            FileRole::PluginPoint => ScanPhase::PluginPoints,
        }
    }

    /// Match a file stem against the conventions.
    pub fn from_stem(stem: &str) -> Option<FileRole> {
        Self::MATCH_ORDER
            .into_iter()
            .find(|role| stem.ends_with(role.suffix()))
    }
}

/// A file that qualifies for one of the three phases.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub role: FileRole,
    /// The stem with the convention suffix removed, e.g. `Foo` for `FooBuilder.swift`.
    pub prefix: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The stem matched a suffix but what precedes it is not an identifier.
    MalformedName,
    TooLarge { size: u64, limit: u64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MalformedName => f.write_str("file name does not follow the naming convention"),
            SkipReason::TooLarge { size, limit } => {
                write!(f, "file is {size} bytes, limit is {limit}")
            }
        }
    }
}

/// A file that matched a convention but will not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub role: FileRole,
    pub reason: SkipReason,
}

/// Aggregate statistics for discovery.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryStats {
    pub files_seen: usize,
    pub walk_errors: usize,
    pub discovery_ms: u64,
}

/// Output of the pre-count pass, one sorted list per phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Discovery {
    pub builders: Vec<DiscoveredFile>,
    pub non_core_components: Vec<DiscoveredFile>,
    pub plugin_points: Vec<DiscoveredFile>,
    pub skipped: Vec<SkippedFile>,
    pub stats: DiscoveryStats,
}

impl Discovery {
    /// Number of files that will be processed across all phases.
    pub fn total(&self) -> usize {
        self.builders.len() + self.non_core_components.len() + self.plugin_points.len()
    }

    pub fn files_for(&self, role: FileRole) -> &[DiscoveredFile] {
        match role {
            FileRole::Builder => &self.builders,
            FileRole::NonCoreComponent => &self.non_core_components,
            FileRole::PluginPoint => &self.plugin_points,
        }
    }

    pub(crate) fn push(&mut self, file: DiscoveredFile) {
        match file.role {
            FileRole::Builder => self.builders.push(file),
            FileRole::NonCoreComponent => self.non_core_components.push(file),
            FileRole::PluginPoint => self.plugin_points.push(file),
        }
    }
}
