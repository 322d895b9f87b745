//! Declaration classification: one pass over a file's [`DeclTree`] that
//! sorts calls and protocol requirements under the declarations they belong
//! to and records which declarations play which DI role.
//!
//! [`DeclTree`]: crate::syntax::DeclTree

pub mod classifier;
pub mod facts;
pub mod markers;

pub use classifier::{Classifier, ClassifierSettings};
pub use facts::{CallFact, Fact, FileFacts, NameTable, PluginConstant, PluginPointFacts, RequirementFact};
