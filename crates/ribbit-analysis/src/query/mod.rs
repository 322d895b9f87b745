//! Read-only dependency queries over a linked hierarchy.

pub mod engine;

pub use engine::{BuildSite, GraphAnalysis, QueryEngine};
