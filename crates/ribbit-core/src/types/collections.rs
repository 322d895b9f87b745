//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// SmallVec for generic argument lists (almost always <4).
pub type SmallVec4<T> = SmallVec<[T; 4]>;

/// SmallVec for dotted type paths (`NeedleFoundation.Component`).
pub type SmallVec2<T> = SmallVec<[T; 2]>;
