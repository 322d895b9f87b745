//! ribbit-core: shared infrastructure for the Ribbit module-graph extractor.
//!
//! Nothing in here knows about Swift or dependency injection. It carries the
//! pieces every other crate leans on:
//! - Errors: one `thiserror` enum per subsystem plus stable error codes
//! - Config: TOML, layered CLI > env > project > user > defaults
//! - Events: handler trait with no-op defaults and a dispatcher
//! - Tracing: `RIBBIT_LOG` driven subscriber setup
//! - Traits: cooperative cancellation

pub mod config;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod traits;
pub mod types;
