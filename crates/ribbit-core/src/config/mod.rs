//! Configuration system for Ribbit.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod extraction_config;
pub mod ribbit_config;
pub mod scan_config;

pub use extraction_config::ExtractionConfig;
pub use ribbit_config::{CliOverrides, RibbitConfig};
pub use scan_config::ScanConfig;
