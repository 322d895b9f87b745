//! Single-pass declaration classifier.

use ribbit_core::config::ExtractionConfig;
use ribbit_core::config::extraction_config::{DEFAULT_NAMESPACE_PREFIXES, DEFAULT_TRAVERSAL_LIMIT};
use ribbit_core::types::collections::FxHashSet;

use super::facts::{CallFact, Fact, FileFacts, PluginConstant, PluginPointFacts, RequirementFact};
use super::markers::{self, Role};
use crate::syntax::{CallSite, DeclTree, NodeId, NodeKind, ProtocolDecl, TypeDecl, TypeRef};

/// Resolved extraction knobs.
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Maximum lexical-parent hops when searching upward.
    pub traversal_limit: usize,
    /// Namespaces stripped from base types before role matching.
    pub namespaces: Vec<String>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            traversal_limit: DEFAULT_TRAVERSAL_LIMIT,
            namespaces: DEFAULT_NAMESPACE_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl From<&ExtractionConfig> for ClassifierSettings {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            traversal_limit: config.effective_traversal_limit(),
            namespaces: config.effective_namespace_prefixes(),
        }
    }
}

/// Visits a [`DeclTree`] once and produces [`FileFacts`].
///
/// Calls are attributed to their nearest enclosing type declaration. The
/// first non-ignored call inside a declaration registers that declaration's
/// role (builder, component, plugin point) under the module key taken from
/// its base type's first generic argument. Protocols inheriting from a
/// `Dependency` type contribute one requirement per member.
pub struct Classifier {
    settings: ClassifierSettings,
}

impl Classifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    pub fn classify(&self, tree: &DeclTree) -> FileFacts {
        let mut facts = FileFacts::new(tree.path());
        let mut registered: FxHashSet<NodeId> = FxHashSet::default();

        for id in tree.ids() {
            match tree.kind(id) {
                NodeKind::Call(call) => self.visit_call(tree, id, call, &mut facts, &mut registered),
                NodeKind::Protocol(proto) => visit_protocol(tree, id, proto, &mut facts),
                _ => {}
            }
        }
        facts
    }

    fn visit_call(
        &self,
        tree: &DeclTree,
        id: NodeId,
        call: &CallSite,
        facts: &mut FileFacts,
        registered: &mut FxHashSet<NodeId>,
    ) {
        if markers::is_ignored_callee(&call.callee) {
            return;
        }
        let Some((decl_id, decl)) = tree.enclosing_type_decl(id, self.settings.traversal_limit)
        else {
            return;
        };

        if !decl.is_extension() {
            let Some(base) = decl.primary_base() else {
                return;
            };
            if registered.insert(decl_id) {
                facts.by_name.entry(decl.name.clone()).or_default();
                self.register(tree, decl_id, decl, base, facts);
            }
        }

        if markers::is_instantiation(&call.callee) {
            facts
                .by_name
                .entry(decl.name.clone())
                .or_default()
                .push(Fact::Call(CallFact {
                    callee: call.callee.clone(),
                    node: id,
                    line: tree.node(id).line,
                }));
        }
    }

    fn register(
        &self,
        tree: &DeclTree,
        decl_id: NodeId,
        decl: &TypeDecl,
        base: &TypeRef,
        facts: &mut FileFacts,
    ) {
        let base_name = base.role_name(&self.settings.namespaces);
        let key = base.first_generic().map(|g| g.text().to_string());
        let companion = || {
            (base.generic_args().len() > 1)
                .then(|| base.last_generic_containing(markers::NON_CORE))
                .flatten()
                .map(|t| t.text().to_string())
        };

        match (Role::of(&base_name, key.is_some()), key) {
            (Role::Component { plain }, Some(key)) => {
                facts.component_names.insert(key, decl.name.as_str());
                if plain {
                    if let Some(non_core) = companion() {
                        facts.non_core_component_names.insert(decl.name.as_str(), non_core);
                    }
                }
            }
            (Role::PluginizedComponent, Some(key)) => {
                let key = markers::embedded_dependency_name(&decl.header).unwrap_or(key);
                facts.component_names.insert(key, decl.name.as_str());
                if let Some(non_core) = companion() {
                    facts.non_core_component_names.insert(decl.name.as_str(), non_core);
                }
            }
            (Role::Builder, Some(key)) => facts.builder_names.insert(key, decl.name.as_str()),
            (Role::PluginizedBuilder, Some(key)) => {
                facts.pluginized_builder_names.insert(key, decl.name.as_str())
            }
            (Role::CustomBuilder, _) => facts.builder_names.insert(base_name, decl.name.as_str()),
            (Role::PluginPoint, key) => {
                facts
                    .plugin_points
                    .push(collect_plugin_point(tree, decl_id, decl, key));
            }
            (Role::UnknownComponent, _) => {
                tracing::debug!(decl = %decl.name, base = %base_name, "unknown component type");
            }
            (Role::UnknownBuilder, _) => {
                tracing::debug!(decl = %decl.name, base = %base_name, "unknown builder type");
            }
            (role, _) => {
                tracing::trace!(decl = %decl.name, base = %base_name, ?role, "unhandled base type");
            }
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierSettings::default())
    }
}

fn visit_protocol(tree: &DeclTree, id: NodeId, proto: &ProtocolDecl, facts: &mut FileFacts) {
    if !proto.inherits_containing(markers::DEPENDENCY) {
        return;
    }
    facts.dependency_names.push(proto.name.clone());

    for member_id in tree.children(id) {
        if let NodeKind::ProtocolMember(member) = tree.kind(*member_id) {
            facts
                .by_name
                .entry(proto.name.clone())
                .or_default()
                .push(Fact::Requirement(RequirementFact {
                    member: member.clone(),
                    line: tree.node(*member_id).line,
                }));
        }
    }
}

fn collect_plugin_point(
    tree: &DeclTree,
    decl_id: NodeId,
    decl: &TypeDecl,
    dependency: Option<String>,
) -> PluginPointFacts {
    let mut constants = Vec::new();
    let mut factory_type = None;
    for binding in tree.member_bindings(decl_id) {
        if binding.is_constant {
            constants.push(PluginConstant {
                name: binding.name.clone(),
                declared_type: binding.declared_type.clone(),
            });
        } else if binding.name.contains(markers::PLUGIN_FACTORIES) {
            factory_type = binding.declared_type.clone();
        }
    }
    PluginPointFacts {
        name: decl.name.clone(),
        file: tree.path().to_path_buf(),
        dependency,
        constants,
        factory_type,
    }
}
