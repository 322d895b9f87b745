//! Merging non-core companion components into already-built modules.
//!
//! A `*NonCoreComponent` file is prepared on a worker (calls and
//! requirements resolved against its own tree) and merged by the reducer,
//! which owns the [`ModuleSet`]. Merging is idempotent: applying the same
//! contribution twice adds nothing the second time.

use std::path::PathBuf;

use ribbit_core::errors::ExtractionError;

use super::record_builder::{place, requirement, ModuleRecordBuilder, Placement};
use super::set::ModuleSet;
use super::types::{Dependency, ModuleId, Scope};
use crate::extraction::FileFacts;
use crate::syntax::DeclTree;

/// What one non-core component contributes to its module.
#[derive(Debug, Clone, PartialEq)]
pub struct NonCoreContribution {
    pub path: PathBuf,
    /// Declared name of the companion component.
    pub component: String,
    /// Calls as built dependencies; builder calls become child references
    /// when merged.
    pub calls: Vec<Dependency>,
    pub requirements: Vec<Dependency>,
}

/// Counts of what a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub modules_touched: usize,
    pub entries_added: usize,
}

/// Collect the contributions of one non-core file.
///
/// Every component is paired with the last dependency protocol declared in
/// the file; a component without one is an error and the file contributes
/// nothing.
pub fn prepare_non_core(
    tree: &DeclTree,
    facts: &FileFacts,
    builder: &ModuleRecordBuilder,
) -> Result<Vec<NonCoreContribution>, ExtractionError> {
    let mut contributions = Vec::with_capacity(facts.component_names.len());
    for (_, component) in facts.component_names.iter() {
        let Some(protocol) = facts.dependency_names.last() else {
            return Err(ExtractionError::MissingDependency {
                component: component.to_string(),
                path: facts.path.clone(),
            });
        };
        contributions.push(NonCoreContribution {
            path: facts.path.clone(),
            component: component.to_string(),
            calls: facts
                .calls_for(component)
                .map(|call| builder.built_candidate(tree, call, Scope::NonCore))
                .collect(),
            requirements: facts
                .requirements_for(protocol)
                .map(|req| requirement(req, Scope::NonCore))
                .collect(),
        });
    }
    Ok(contributions)
}

/// Attach contributions to the modules naming their component as non-core
/// companion.
///
/// All contributions are matched before any is applied, so an unmatched
/// component leaves the set untouched.
pub fn merge_non_core(
    set: &mut ModuleSet,
    contributions: &[NonCoreContribution],
) -> Result<MergeOutcome, ExtractionError> {
    let targets = contributions
        .iter()
        .map(|c| {
            set.find_by_non_core_component(&c.component)
                .ok_or_else(|| ExtractionError::UnmatchedNonCore {
                    component: c.component.clone(),
                    path: c.path.clone(),
                })
        })
        .collect::<Result<Vec<ModuleId>, _>>()?;

    let mut outcome = MergeOutcome::default();
    for (contribution, id) in contributions.iter().zip(targets) {
        let added = apply(set, id, contribution);
        if added > 0 {
            outcome.modules_touched += 1;
            outcome.entries_added += added;
        }
    }
    Ok(outcome)
}

fn apply(set: &mut ModuleSet, id: ModuleId, contribution: &NonCoreContribution) -> usize {
    let Some(module) = set.get_mut(id) else {
        return 0;
    };
    let mut added = 0;

    if !module.non_core_components.contains(&contribution.component) {
        module.non_core_components.push(contribution.component.clone());
        added += 1;
    }

    for candidate in &contribution.calls {
        let mut candidate = candidate.clone();
        candidate.owner = id;
        let inserted = match place(candidate, module.name()) {
            Placement::Child(reference) => module.add_child_reference(reference),
            Placement::Built(dep) => module.add_built(dep),
        };
        added += usize::from(inserted);
    }

    for req in &contribution.requirements {
        let mut req = req.clone();
        req.owner = id;
        added += usize::from(module.add_required(req));
    }

    tracing::debug!(
        module = %module.name(),
        component = %contribution.component,
        added,
        "non-core component merged"
    );
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Classifier;
    use crate::modules::{DependencyKind, Module};
    use crate::syntax::{
        Binding, CallSite, DeclKeyword, MemberKind, NodeKind, ProtocolDecl, ProtocolMember,
        TypeDecl, TypeRef,
    };

    fn ride_module() -> Module {
        let mut module = Module::new("RideBuilder", "RideComponent", "RideBuilder.swift");
        module.component_name = Some("RideComponent".into());
        module.non_core_component_name = Some("RideNonCoreComponent".into());
        module
    }

    fn non_core_file(with_protocol: bool) -> DeclTree {
        let mut tree = DeclTree::new("RideNonCoreComponent.swift");
        let root = tree.root();
        if with_protocol {
            let proto = tree.push(
                root,
                NodeKind::Protocol(ProtocolDecl {
                    name: "RideNonCoreDependency".into(),
                    inheritance: TypeRef::parse("Dependency").into_iter().collect(),
                }),
                1,
            );
            tree.push(
                proto,
                NodeKind::ProtocolMember(ProtocolMember {
                    kind: MemberKind::Property,
                    name: "surge".into(),
                    declared_type: Some("SurgeStreaming".into()),
                    canonical_text: "varsurge:SurgeStreaming".into(),
                }),
                2,
            );
        }
        let component = tree.push(
            root,
            NodeKind::TypeDecl(TypeDecl {
                keyword: DeclKeyword::Class,
                name: "RideNonCoreComponent".into(),
                inheritance: TypeRef::parse("NonCoreComponent<RideNonCoreDependency>")
                    .into_iter()
                    .collect(),
                header: "class RideNonCoreComponent: NonCoreComponent<RideNonCoreDependency>".into(),
            }),
            4,
        );
        let binding = tree.push(
            component,
            NodeKind::Binding(Binding {
                is_constant: false,
                name: "pricing".into(),
                declared_type: Some("PricingProviding".into()),
            }),
            5,
        );
        tree.push(binding, NodeKind::Call(CallSite { callee: "PricingProvider".into() }), 6);
        tree.push(component, NodeKind::Call(CallSite { callee: "SurgeBuilder".into() }), 7);
        tree
    }

    fn contributions(tree: &DeclTree) -> Result<Vec<NonCoreContribution>, ExtractionError> {
        let facts = Classifier::default().classify(tree);
        prepare_non_core(tree, &facts, &ModuleRecordBuilder::new(10))
    }

    #[test]
    fn merge_attaches_non_core_scoped_entries() {
        let mut set: ModuleSet = std::iter::once(ride_module()).collect();
        let prepared = contributions(&non_core_file(true)).unwrap();
        let outcome = merge_non_core(&mut set, &prepared).unwrap();

        assert_eq!(outcome.modules_touched, 1);
        assert_eq!(outcome.entries_added, 4);

        let (id, module) = set.iter().next().unwrap();
        assert_eq!(module.non_core_components, vec!["RideNonCoreComponent".to_string()]);
        assert_eq!(module.child_references[0].name, "SurgeBuilder");
        assert_eq!(module.child_references[0].scope, Scope::NonCore);

        let built = &module.built_dependencies[0];
        assert_eq!(built.kind, DependencyKind::Built);
        assert_eq!(built.scope, Scope::NonCore);
        assert_eq!(built.owner, id);
        assert_eq!(built.inferred_abstraction.as_deref(), Some("PricingProviding"));

        let required = &module.required_dependencies[0];
        assert_eq!(required.display_text, "SurgeStreaming");
        assert_eq!(required.scope, Scope::NonCore);
    }

    #[test]
    fn merging_twice_adds_nothing() {
        let mut set: ModuleSet = std::iter::once(ride_module()).collect();
        let prepared = contributions(&non_core_file(true)).unwrap();
        merge_non_core(&mut set, &prepared).unwrap();
        let second = merge_non_core(&mut set, &prepared).unwrap();

        assert_eq!(second, MergeOutcome::default());
        let (_, module) = set.iter().next().unwrap();
        assert_eq!(module.non_core_components.len(), 1);
        assert_eq!(module.child_references.len(), 1);
        assert_eq!(module.built_dependencies.len(), 1);
        assert_eq!(module.required_dependencies.len(), 1);
    }

    #[test]
    fn component_without_protocol_is_an_error() {
        let err = contributions(&non_core_file(false)).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingDependency { .. }));
    }

    #[test]
    fn unmatched_component_leaves_set_untouched() {
        let mut module = ride_module();
        module.non_core_component_name = Some("OtherNonCoreComponent".into());
        let mut set: ModuleSet = std::iter::once(module).collect();
        let prepared = contributions(&non_core_file(true)).unwrap();

        let err = merge_non_core(&mut set, &prepared).unwrap_err();
        assert!(matches!(err, ExtractionError::UnmatchedNonCore { .. }));
        let (_, module) = set.iter().next().unwrap();
        assert!(module.non_core_components.is_empty());
        assert!(module.built_dependencies.is_empty());
    }
}
