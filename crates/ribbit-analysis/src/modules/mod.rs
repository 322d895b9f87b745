//! Module records: building them from classified facts, the flat module
//! arena of a scan, and merging non-core companions into it.

pub mod non_core;
pub mod record_builder;
pub mod set;
pub mod types;

pub use non_core::{merge_non_core, prepare_non_core, MergeOutcome, NonCoreContribution};
pub use record_builder::ModuleRecordBuilder;
pub use set::ModuleSet;
pub use types::{
    ChildReference, Dependency, DependencyKind, Module, ModuleId, RequirementMember, Scope,
};
