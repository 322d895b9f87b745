//! The linked module arena of one scan.

use ribbit_core::types::collections::{FxHashMap, FxHashSet, SmallVec2};
use serde::Serialize;

use super::linker;
use crate::modules::{Module, ModuleId, ModuleSet};

/// What linking resolved and what it dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub edges_linked: usize,
    /// References whose name matched no module.
    pub unresolved: usize,
    /// References whose name matched more than one module.
    pub ambiguous: usize,
}

/// A forest of modules addressed by [`ModuleId`].
///
/// Built once per scan and read-only afterwards. `children` and `parent`
/// are ids into the same arena, so cycles in the child graph are harmless.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    modules: Vec<Module>,
    report: LinkReport,
}

impl Hierarchy {
    /// Resolve every module's child references against the whole set.
    pub fn link(set: ModuleSet, warn_on_ambiguous: bool) -> Self {
        let mut modules = set.into_modules();
        let report = linker::link(&mut modules, warn_on_ambiguous);
        Self { modules, report }
    }

    pub fn report(&self) -> LinkReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.index())
    }

    /// Every module in scan order.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, m)| (ModuleId(i as u32), m))
    }

    /// First module named `name`.
    pub fn find_by_name(&self, name: &str) -> Option<ModuleId> {
        self.modules().find(|(_, m)| m.name() == name).map(|(id, _)| id)
    }

    pub fn children(&self, id: ModuleId) -> &[ModuleId] {
        self.module(id).map(Module::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: ModuleId) -> Option<ModuleId> {
        self.module(id).and_then(Module::parent)
    }

    /// Parent chain of `id`, nearest first. Stops at the first repeat.
    pub fn ancestors(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.parent(parent);
        }
        chain
    }

    /// `targets` plus every module with a child path down to one of them.
    ///
    /// Follows all `children` edges backwards, not just the first-linked
    /// `parent`, so a module shared by several parents keeps all of them.
    pub fn reaching(&self, targets: impl IntoIterator<Item = ModuleId>) -> FxHashSet<ModuleId> {
        let mut linked_from: FxHashMap<ModuleId, SmallVec2<ModuleId>> = FxHashMap::default();
        for (id, module) in self.modules() {
            for child in module.children() {
                linked_from.entry(*child).or_default().push(id);
            }
        }

        let mut reached = FxHashSet::default();
        let mut stack: Vec<ModuleId> = targets.into_iter().collect();
        while let Some(id) = stack.pop() {
            if !reached.insert(id) {
                continue;
            }
            if let Some(parents) = linked_from.get(&id) {
                stack.extend(parents.iter().copied());
            }
        }
        reached
    }

    /// Modules nothing links to.
    pub fn roots(&self) -> Vec<ModuleId> {
        self.modules()
            .filter(|(_, m)| m.parent().is_none())
            .map(|(id, _)| id)
            .collect()
    }
}
