//! Event system for Ribbit.
//! Trait with no-op defaults, synchronous dispatch, subscribe at any time.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::RibbitEventHandler;
