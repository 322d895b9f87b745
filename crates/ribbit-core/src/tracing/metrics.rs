//! Structured span field names shared by all Ribbit subsystems.

/// Scanner: number of files discovered in the pre-count pass.
pub const FILES_DISCOVERED: &str = "files_discovered";

/// Scanner: file discovery duration in milliseconds.
pub const DISCOVERY_DURATION: &str = "discovery_duration";

/// Pipeline: duration of one extraction phase in milliseconds.
pub const PHASE_DURATION: &str = "phase_duration";

/// Parser: per-file parse time in microseconds.
pub const PARSE_TIME_US: &str = "parse_time_us";

/// Hierarchy: child edges linked.
pub const EDGES_LINKED: &str = "edges_linked";

/// Hierarchy: child references left unresolved or ambiguous.
pub const REFERENCES_UNRESOLVED: &str = "references_unresolved";

/// Layout: number of depth levels produced.
pub const LAYOUT_DEPTH: &str = "layout_depth";
