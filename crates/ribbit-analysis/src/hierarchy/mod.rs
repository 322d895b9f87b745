//! Cross-file linking of module records into a hierarchy, and the
//! level-order layout computed from it.

pub mod graph;
pub mod layout;
mod linker;

pub use graph::{Hierarchy, LinkReport};
pub use layout::{descendant_count, select_root, LevelLayout};
