use proptest::prelude::*;
use ribbit_analysis::hierarchy::{descendant_count, select_root};
use ribbit_analysis::modules::{ChildReference, ModuleSet};
use ribbit_analysis::{Hierarchy, LevelLayout, Module, ModuleId, Scope};
use ribbit_core::types::collections::FxHashSet;

/// `refs[i]` lists the indices module `i` references as children. Indices
/// may repeat, point at the module itself, or form cycles.
fn hierarchy(refs: &[Vec<usize>]) -> Hierarchy {
    let n = refs.len();
    let modules = refs.iter().enumerate().map(|(i, targets)| {
        let mut m = Module::new(format!("M{i}Builder"), format!("M{i}Dependency"), format!("M{i}Builder.swift"));
        m.child_references = targets
            .iter()
            .map(|t| ChildReference {
                name: format!("M{}Builder", t % n),
                scope: Scope::Core,
                line: 1,
            })
            .collect();
        m
    });
    Hierarchy::link(modules.collect::<ModuleSet>(), false)
}

fn graphs() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..=8).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0..n, 0..4), n))
}

fn reachable(h: &Hierarchy, root: ModuleId) -> FxHashSet<ModuleId> {
    let mut seen = FxHashSet::default();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if seen.insert(id) {
            stack.extend(h.children(id).iter().copied());
        }
    }
    seen
}

proptest! {
    #[test]
    fn root_is_first_module_with_most_descendants(refs in graphs()) {
        let h = hierarchy(&refs);
        let counts: Vec<usize> = h.modules().map(|(id, _)| descendant_count(&h, id)).collect();
        let best = counts.iter().copied().max().unwrap();
        let first = counts.iter().position(|&c| c == best).unwrap();
        let root = select_root(&h).unwrap();
        prop_assert_eq!(root.index(), first);
    }

    #[test]
    fn layout_terminates_and_is_bounded(refs in graphs()) {
        let h = hierarchy(&refs);
        let layout = LevelLayout::compute(&h);
        let root = layout.root.unwrap();

        prop_assert_eq!(&layout.levels[0], &vec![root]);
        prop_assert!(layout.depth() <= h.len());
        prop_assert!(layout.levels.iter().all(|level| !level.is_empty()));
    }

    #[test]
    fn every_placed_module_hangs_off_the_previous_level(refs in graphs()) {
        let h = hierarchy(&refs);
        let layout = LevelLayout::compute(&h);
        for depth in 1..layout.depth() {
            for id in &layout.levels[depth] {
                let placed_under = layout.levels[depth - 1]
                    .iter()
                    .any(|parent| h.children(*parent).contains(id));
                prop_assert!(placed_under, "module {:?} at level {} has no parent above", id, depth);
            }
        }
    }

    #[test]
    fn layout_covers_everything_reachable_from_root(refs in graphs()) {
        let h = hierarchy(&refs);
        let layout = LevelLayout::compute(&h);
        let root = layout.root.unwrap();

        let placed: FxHashSet<ModuleId> = layout.levels.iter().flatten().copied().collect();
        prop_assert_eq!(placed, reachable(&h, root));
    }

    #[test]
    fn linked_children_have_a_parent_and_never_self(refs in graphs()) {
        let h = hierarchy(&refs);
        for (id, _) in h.modules() {
            for child in h.children(id) {
                prop_assert_ne!(*child, id);
                prop_assert!(h.parent(*child).is_some());
            }
        }
    }
}
