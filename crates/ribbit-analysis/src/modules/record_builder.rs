//! Module records from one file's classified facts.

use crate::extraction::markers::{self, BUILDER};
use crate::extraction::{CallFact, ClassifierSettings, FileFacts, RequirementFact};
use crate::syntax::{DeclTree, MemberKind};

use super::types::{ChildReference, Dependency, Module, RequirementMember, Scope};

/// Where a call ends up on its module.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Placement {
    Child(ChildReference),
    Built(Dependency),
}

/// Turns [`FileFacts`] into [`Module`] records.
#[derive(Debug, Clone)]
pub struct ModuleRecordBuilder {
    traversal_limit: usize,
}

impl ModuleRecordBuilder {
    pub fn new(traversal_limit: usize) -> Self {
        Self { traversal_limit }
    }

    pub fn traversal_limit(&self) -> usize {
        self.traversal_limit
    }

    /// One module per registered builder: plain builders first, then
    /// pluginized ones, each in first-seen order.
    pub fn build(&self, tree: &DeclTree, facts: &FileFacts) -> Vec<Module> {
        facts
            .builder_names
            .iter()
            .chain(facts.pluginized_builder_names.iter())
            .map(|(key, builder)| self.build_one(tree, facts, key, builder))
            .collect()
    }

    fn build_one(&self, tree: &DeclTree, facts: &FileFacts, key: &str, builder: &str) -> Module {
        let mut module = Module::new(builder, key, facts.path.clone());

        let component = resolve_component(facts, key);
        if let Some((_, component_name)) = component {
            module.component_name = Some(component_name.to_string());
            module.non_core_component_name = facts
                .non_core_component_names
                .get(component_name)
                .map(str::to_string);
        }

        let component_calls = component
            .into_iter()
            .flat_map(|(_, name)| facts.calls_for(name));
        for call in component_calls.chain(facts.calls_for(builder)) {
            let candidate = self.built_candidate(tree, call, Scope::Core);
            match place(candidate, module.name()) {
                Placement::Child(reference) => module.child_references.push(reference),
                Placement::Built(dep) => module.built_dependencies.push(dep),
            }
        }

        let protocol = resolve_protocol(facts, key, component.map(|(k, _)| k));
        if let Some(protocol) = protocol {
            module.required_dependencies.extend(
                facts
                    .requirements_for(protocol)
                    .map(|req| requirement(req, Scope::Core)),
            );
        }

        tracing::trace!(
            module = %module.name(),
            children = module.child_references.len(),
            built = module.built_dependencies.len(),
            required = module.required_dependencies.len(),
            "module record built"
        );
        module
    }

    /// A call as a built dependency, with the declared type of its nearest
    /// enclosing binding as the inferred abstraction.
    pub(crate) fn built_candidate(&self, tree: &DeclTree, call: &CallFact, scope: Scope) -> Dependency {
        let inferred = if markers::is_structural(&call.callee) {
            None
        } else {
            tree.enclosing_binding(call.node, self.traversal_limit)
                .and_then(|b| b.declared_type.clone())
        };
        Dependency::built(call.callee.clone(), inferred, scope, call.line)
    }
}

impl From<&ClassifierSettings> for ModuleRecordBuilder {
    fn from(settings: &ClassifierSettings) -> Self {
        Self::new(settings.traversal_limit)
    }
}

/// A callee mentioning `Builder` that is not the module itself is a child
/// reference; anything else stays a built dependency.
pub(crate) fn place(candidate: Dependency, module_name: &str) -> Placement {
    if candidate.display_text.contains(BUILDER) && candidate.display_text != module_name {
        return Placement::Child(ChildReference {
            name: candidate.display_text,
            scope: candidate.scope,
            line: candidate.line,
        });
    }
    Placement::Built(candidate)
}

/// The component paired with a module key: registered under the key, named
/// by the key, or the file's only component.
fn resolve_component<'a>(facts: &'a FileFacts, key: &str) -> Option<(&'a str, &'a str)> {
    if let Some((k, name)) = facts.component_names.iter().find(|(k, _)| *k == key) {
        return Some((k, name));
    }
    if let Some(found) = facts.component_names.iter().find(|(_, name)| *name == key) {
        return Some(found);
    }
    if facts.component_names.len() == 1 {
        return facts.component_names.iter().next();
    }
    None
}

/// The dependency protocol holding a module's requirements.
fn resolve_protocol<'a>(
    facts: &'a FileFacts,
    key: &'a str,
    component_key: Option<&'a str>,
) -> Option<&'a str> {
    if facts.is_dependency_protocol(key) {
        return Some(key);
    }
    if let Some(ck) = component_key.filter(|ck| facts.is_dependency_protocol(ck)) {
        return Some(ck);
    }
    match facts.dependency_names.as_slice() {
        [only] => Some(only.as_str()),
        _ => None,
    }
}

/// A protocol member as a required dependency.
pub(crate) fn requirement(req: &RequirementFact, scope: Scope) -> Dependency {
    let member = &req.member;
    let display_text = match (member.kind, &member.declared_type) {
        (MemberKind::Property, Some(ty)) => ty.clone(),
        _ => member.canonical_text.clone(),
    };
    Dependency::required(
        display_text,
        RequirementMember {
            name: member.name.clone(),
            kind: member.kind,
        },
        scope,
        req.line,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Classifier;
    use crate::modules::DependencyKind;
    use crate::syntax::{
        Binding, CallSite, DeclKeyword, NodeId, NodeKind, ProtocolDecl, ProtocolMember, TypeDecl,
        TypeRef,
    };

    fn class(tree: &mut DeclTree, name: &str, base: &str) -> NodeId {
        let root = tree.root();
        tree.push(
            root,
            NodeKind::TypeDecl(TypeDecl {
                keyword: DeclKeyword::Class,
                name: name.into(),
                inheritance: TypeRef::parse(base).into_iter().collect(),
                header: format!("class {name}: {base}"),
            }),
            1,
        )
    }

    fn call(tree: &mut DeclTree, parent: NodeId, callee: &str) -> NodeId {
        tree.push(parent, NodeKind::Call(CallSite { callee: callee.into() }), 2)
    }

    fn property(tree: &mut DeclTree, parent: NodeId, name: &str, ty: &str) -> NodeId {
        tree.push(
            parent,
            NodeKind::Binding(Binding {
                is_constant: false,
                name: name.into(),
                declared_type: Some(ty.into()),
            }),
            3,
        )
    }

    /// `FooBuilder` with a component building `FooService` behind
    /// `FooServicing`, a child `BarBuilder`, and one requirement.
    fn foo_file() -> DeclTree {
        let mut tree = DeclTree::new("FooBuilder.swift");
        let root = tree.root();
        let proto = tree.push(
            root,
            NodeKind::Protocol(ProtocolDecl {
                name: "FooDependency".into(),
                inheritance: TypeRef::parse("Dependency").into_iter().collect(),
            }),
            1,
        );
        tree.push(
            proto,
            NodeKind::ProtocolMember(ProtocolMember {
                kind: MemberKind::Property,
                name: "analytics".into(),
                declared_type: Some("AnalyticsLogging".into()),
                canonical_text: "varanalytics:AnalyticsLogging".into(),
            }),
            2,
        );

        let component = class(&mut tree, "FooComponent", "Component<FooDependency>");
        let service = property(&mut tree, component, "fooService", "FooServicing");
        let shared = call(&mut tree, service, "shared");
        let closure = tree.push(shared, NodeKind::Closure, 4);
        call(&mut tree, closure, "FooService");
        let vc = property(&mut tree, component, "viewController", "FooViewControllable");
        call(&mut tree, vc, "FooViewController");

        let builder = class(&mut tree, "FooBuilder", "Builder<FooDependency>");
        call(&mut tree, builder, "FooComponent");
        call(&mut tree, builder, "BarBuilder");
        call(&mut tree, builder, "FooBuilder");
        tree
    }

    #[test]
    fn splits_children_from_built_dependencies() {
        let tree = foo_file();
        let facts = Classifier::default().classify(&tree);
        let modules = ModuleRecordBuilder::new(10).build(&tree, &facts);

        assert_eq!(modules.len(), 1);
        let module = &modules[0];
        assert_eq!(module.name(), "FooBuilder");
        assert_eq!(module.key, "FooDependency");
        assert_eq!(module.component_name.as_deref(), Some("FooComponent"));

        let children: Vec<&str> = module.child_references.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(children, vec!["BarBuilder"]);

        let built: Vec<(&str, Option<&str>)> = module
            .built_dependencies
            .iter()
            .map(|d| (d.display_text.as_str(), d.inferred_abstraction.as_deref()))
            .collect();
        assert_eq!(
            built,
            vec![
                ("FooService", Some("FooServicing")),
                ("FooViewController", None),
                ("FooComponent", None),
                ("FooBuilder", None),
            ]
        );

        assert_eq!(module.required_dependencies.len(), 1);
        let required = &module.required_dependencies[0];
        assert_eq!(required.kind, DependencyKind::Required);
        assert_eq!(required.display_text, "AnalyticsLogging");
        assert_eq!(required.abstraction_text(), Some("AnalyticsLogging"));
    }

    #[test]
    fn single_dependency_protocol_is_the_fallback() {
        let mut tree = DeclTree::new("ModeBuilder.swift");
        let root = tree.root();
        let proto = tree.push(
            root,
            NodeKind::Protocol(ProtocolDecl {
                name: "ModeDependency".into(),
                inheritance: TypeRef::parse("Dependency").into_iter().collect(),
            }),
            1,
        );
        tree.push(
            proto,
            NodeKind::ProtocolMember(ProtocolMember {
                kind: MemberKind::Function,
                name: "makeStream".into(),
                declared_type: Some("Streaming".into()),
                canonical_text: "funcmakeStream()->Streaming".into(),
            }),
            2,
        );
        let builder = class(&mut tree, "ModeBuilder", "ModeBuildable");
        call(&mut tree, builder, "ModeRouter");

        let facts = Classifier::default().classify(&tree);
        let modules = ModuleRecordBuilder::new(10).build(&tree, &facts);
        assert_eq!(modules[0].key, "ModeBuildable");
        assert_eq!(modules[0].required_dependencies.len(), 1);
        let required = &modules[0].required_dependencies[0];
        assert_eq!(required.display_text, "funcmakeStream()->Streaming");
        assert_eq!(required.abstraction_text(), None);
    }

    #[test]
    fn pluginized_builder_finds_component_by_name() {
        let mut tree = DeclTree::new("RideBuilder.swift");
        let component = class(
            &mut tree,
            "RideComponent",
            "PluginizedComponent<RideDependency, RidePluginExtension, RideNonCoreComponent>",
        );
        call(&mut tree, component, "RideStream");
        let extra = class(&mut tree, "OtherComponent", "Component<OtherDependency>");
        call(&mut tree, extra, "Other");
        let builder = class(
            &mut tree,
            "RideBuilder",
            "PluginizedBuilder<RideComponent, RideInteractable, RideListener>",
        );
        call(&mut tree, builder, "RideRouter");

        let facts = Classifier::default().classify(&tree);
        let modules = ModuleRecordBuilder::new(10).build(&tree, &facts);
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].component_name.as_deref(), Some("RideComponent"));
        assert_eq!(
            modules[0].non_core_component_name.as_deref(),
            Some("RideNonCoreComponent")
        );
        let built: Vec<&str> = modules[0]
            .built_dependencies
            .iter()
            .map(|d| d.display_text.as_str())
            .collect();
        assert_eq!(built, vec!["RideStream", "RideRouter"]);
    }
}
