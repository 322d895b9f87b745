//! Usage and build-site resolution by textual identity.

use ribbit_core::types::collections::FxHashSet;
use serde::Serialize;

use crate::hierarchy::Hierarchy;
use crate::modules::{Dependency, ModuleId, RequirementMember, Scope};
use crate::syntax::{canonical, MemberKind};

/// The module that builds a dependency, and the concrete type it calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSite {
    pub module: ModuleId,
    pub call_name: String,
}

/// Both query results for one dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphAnalysis {
    pub used_in: Vec<ModuleId>,
    pub built_in: Option<BuildSite>,
}

/// Answers dependency questions against one hierarchy. Pure reads.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'h> {
    hierarchy: &'h Hierarchy,
}

impl<'h> QueryEngine<'h> {
    pub fn new(hierarchy: &'h Hierarchy) -> Self {
        Self { hierarchy }
    }

    /// A property requirement standing for `type_text`, for callers that
    /// only have a type name.
    pub fn probe(type_text: &str) -> Dependency {
        let text = canonical(type_text);
        Dependency::required(
            text.clone(),
            RequirementMember {
                name: text,
                kind: MemberKind::Property,
            },
            Scope::Core,
            0,
        )
    }

    /// First required dependency displayed as `text`, in scan order.
    pub fn find_required(&self, text: &str) -> Option<&'h Dependency> {
        let text = canonical(text);
        self.hierarchy
            .modules()
            .flat_map(|(_, m)| m.required_dependencies.iter())
            .find(|d| d.display_text == text)
    }

    /// Modules requiring a dependency displayed like `dep`, each once, in
    /// scan order.
    pub fn usages(&self, dep: &Dependency) -> Vec<ModuleId> {
        self.hierarchy
            .modules()
            .filter(|(_, m)| {
                m.required_dependencies
                    .iter()
                    .any(|r| r.display_text == dep.display_text)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// The module building an implementation of `dep`'s abstraction. When
    /// several do, the last one in scan order wins.
    pub fn built_by(&self, dep: &Dependency) -> Option<BuildSite> {
        let abstraction = dep.abstraction_text()?;
        let mut found = None;
        for (id, module) in self.hierarchy.modules() {
            for built in &module.built_dependencies {
                if built.inferred_abstraction.as_deref() == Some(abstraction) {
                    found = Some(BuildSite {
                        module: id,
                        call_name: built.display_text.clone(),
                    });
                }
            }
        }
        found
    }

    pub fn analyze(&self, dep: &Dependency) -> GraphAnalysis {
        GraphAnalysis {
            used_in: self.usages(dep),
            built_in: self.built_by(dep),
        }
    }

    /// Modules to keep when laying out the subgraph of one analysis: every
    /// user, the builder, and every module that links down to one of them.
    pub fn subgraph_filter(&self, analysis: &GraphAnalysis) -> FxHashSet<ModuleId> {
        let hits = analysis
            .used_in
            .iter()
            .copied()
            .chain(analysis.built_in.as_ref().map(|site| site.module));
        self.hierarchy.reaching(hits)
    }
}
