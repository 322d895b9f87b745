//! Name resolution of child references.

use ribbit_core::types::collections::{FxHashMap, SmallVec2};

use super::graph::LinkReport;
use crate::modules::{Module, ModuleId};

/// Link every child reference that names exactly one other module.
///
/// An edge is added once per (parent, child) pair; a child's parent is
/// the first module that links it and is never overwritten.
pub(super) fn link(modules: &mut [Module], warn_on_ambiguous: bool) -> LinkReport {
    let mut by_name: FxHashMap<&str, SmallVec2<ModuleId>> = FxHashMap::default();
    for (i, module) in modules.iter().enumerate() {
        by_name
            .entry(module.name())
            .or_default()
            .push(ModuleId(i as u32));
    }

    let mut report = LinkReport::default();
    let mut edges: Vec<(ModuleId, ModuleId)> = Vec::new();

    for (i, module) in modules.iter().enumerate() {
        let parent = ModuleId(i as u32);
        let mut linked: SmallVec2<ModuleId> = module.children().iter().copied().collect();

        for reference in &module.child_references {
            let candidates = by_name.get(reference.name.as_str()).map(|c| c.as_slice());
            match candidates {
                Some([child]) => {
                    if *child == parent || linked.contains(child) {
                        continue;
                    }
                    linked.push(*child);
                    edges.push((parent, *child));
                }
                Some(many) if many.len() > 1 => {
                    report.ambiguous += 1;
                    if warn_on_ambiguous {
                        tracing::warn!(
                            module = %module.name(),
                            reference = %reference.name,
                            candidates = many.len(),
                            "ambiguous child reference skipped"
                        );
                    } else {
                        tracing::debug!(
                            module = %module.name(),
                            reference = %reference.name,
                            candidates = many.len(),
                            "ambiguous child reference skipped"
                        );
                    }
                }
                _ => {
                    report.unresolved += 1;
                    tracing::trace!(
                        module = %module.name(),
                        reference = %reference.name,
                        "unresolved child reference"
                    );
                }
            }
        }
    }

    drop(by_name);
    for (parent, child) in edges {
        modules[parent.index()].children.push(child);
        let slot = &mut modules[child.index()].parent;
        if slot.is_none() {
            *slot = Some(parent);
        }
        report.edges_linked += 1;
    }

    tracing::debug!(
        modules = modules.len(),
        edges = report.edges_linked,
        unresolved = report.unresolved,
        ambiguous = report.ambiguous,
        "hierarchy linked"
    );
    report
}
