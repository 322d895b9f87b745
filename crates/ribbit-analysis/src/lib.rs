//! # ribbit-analysis
//!
//! Static extraction of DI module graphs: discovery → Swift declaration trees →
//! classification → module records → non-core merge → linking → level layout.
//! Dependency usage and build-site queries run against the linked hierarchy.

pub mod extraction;
pub mod hierarchy;
pub mod modules;
pub mod pipeline;
pub mod query;
pub mod scanner;
pub mod syntax;

pub use hierarchy::{Hierarchy, LevelLayout, LinkReport};
pub use modules::{Dependency, DependencyKind, Module, ModuleId, Scope};
pub use pipeline::{RibbitSession, ScanOutcome, ScanPipeline, ScanStats};
pub use query::{BuildSite, GraphAnalysis, QueryEngine};
