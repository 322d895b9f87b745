//! Root selection and level-order layout.

use std::collections::VecDeque;

use ribbit_core::types::collections::FxHashSet;
use serde::Serialize;

use super::graph::Hierarchy;
use crate::modules::ModuleId;

/// Modules grouped by depth below the root. A module reachable along
/// several paths appears once per path, possibly on several levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelLayout {
    pub root: Option<ModuleId>,
    pub levels: Vec<Vec<ModuleId>>,
}

impl LevelLayout {
    /// Lay out the whole hierarchy below its selected root.
    pub fn compute(hierarchy: &Hierarchy) -> Self {
        Self::compute_filtered(hierarchy, None)
    }

    /// Lay out only modules in `filter`. A module outside the filter is
    /// dropped together with everything below it. The root is selected over
    /// the whole hierarchy and always kept as the anchor of level 0, even
    /// when it is outside the filter, so a filtered layout lines up with the
    /// full one.
    pub fn compute_filtered(hierarchy: &Hierarchy, filter: Option<&FxHashSet<ModuleId>>) -> Self {
        let Some(root) = select_root(hierarchy) else {
            return Self::default();
        };
        let levels = assign_levels(hierarchy, root, filter);
        let layout = Self {
            root: Some(root),
            levels,
        };
        tracing::debug!(
            depth = layout.depth(),
            modules = layout.module_count(),
            filtered = filter.is_some(),
            "level layout computed"
        );
        layout
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Entries across all levels, repeats included.
    pub fn module_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Module names per level.
    pub fn names<'h>(&self, hierarchy: &'h Hierarchy) -> Vec<Vec<&'h str>> {
        self.levels
            .iter()
            .map(|level| {
                level
                    .iter()
                    .filter_map(|id| hierarchy.module(*id))
                    .map(|m| m.name())
                    .collect()
            })
            .collect()
    }
}

/// Unique modules reachable from `id`, not counting `id` itself.
pub fn descendant_count(hierarchy: &Hierarchy, id: ModuleId) -> usize {
    let mut visited = FxHashSet::default();
    visited.insert(id);
    let mut queue = VecDeque::from([id]);
    let mut count = 0;
    while let Some(node) = queue.pop_front() {
        for child in hierarchy.children(node) {
            if visited.insert(*child) {
                count += 1;
                queue.push_back(*child);
            }
        }
    }
    count
}

/// The module with the most descendants; the first one in scan order wins
/// a tie.
pub fn select_root(hierarchy: &Hierarchy) -> Option<ModuleId> {
    let mut best: Option<(ModuleId, usize)> = None;
    for (id, _) in hierarchy.modules() {
        let count = descendant_count(hierarchy, id);
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((id, count));
        }
    }
    best.map(|(id, _)| id)
}

/// Depth-first pre-order walk appending each module to its depth's level.
/// A module already on the current path is skipped, which bounds the walk
/// on cyclic graphs.
fn assign_levels(
    hierarchy: &Hierarchy,
    root: ModuleId,
    filter: Option<&FxHashSet<ModuleId>>,
) -> Vec<Vec<ModuleId>> {
    let mut levels: Vec<Vec<ModuleId>> = vec![vec![root]];
    let mut on_path: FxHashSet<ModuleId> = FxHashSet::default();
    on_path.insert(root);
    // (module, index of the next child to visit)
    let mut stack: Vec<(ModuleId, usize)> = vec![(root, 0)];

    while let Some(frame) = stack.last_mut() {
        let (node, next) = *frame;
        let Some(&child) = hierarchy.children(node).get(next) else {
            on_path.remove(&node);
            stack.pop();
            continue;
        };
        frame.1 += 1;

        if on_path.contains(&child) || filter.is_some_and(|f| !f.contains(&child)) {
            continue;
        }
        let depth = stack.len();
        if depth == levels.len() {
            levels.push(Vec::new());
        }
        levels[depth].push(child);
        on_path.insert(child);
        stack.push((child, 0));
    }
    levels
}
