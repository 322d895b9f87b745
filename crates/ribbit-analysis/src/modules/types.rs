//! Module and dependency records.

use std::path::PathBuf;

use serde::Serialize;

use crate::syntax::MemberKind;

/// Stable index of a module inside one scan's module arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    /// Owner id of records not yet placed in an arena.
    pub(crate) const DETACHED: ModuleId = ModuleId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DependencyKind {
    /// An abstraction the module declares it needs.
    Required,
    /// A concrete type the module constructs.
    Built,
}

/// Where a fact was found: the module's own files or its non-core companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scope {
    Core,
    NonCore,
}

/// Which protocol member a required dependency came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementMember {
    pub name: String,
    pub kind: MemberKind,
}

/// A required abstraction or a built concrete type.
///
/// Records are never shared between modules. "The same" dependency in two
/// modules is two records whose texts compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub kind: DependencyKind,
    pub owner: ModuleId,
    /// Canonical text used for matching: the property type of a requirement,
    /// the callee of a built dependency.
    pub display_text: String,
    pub scope: Scope,
    /// Built only: declared type of the nearest enclosing binding.
    pub inferred_abstraction: Option<String>,
    /// Required only.
    pub member: Option<RequirementMember>,
    pub line: u32,
}

impl Dependency {
    pub fn required(display_text: impl Into<String>, member: RequirementMember, scope: Scope, line: u32) -> Self {
        Self {
            kind: DependencyKind::Required,
            owner: ModuleId::DETACHED,
            display_text: display_text.into(),
            scope,
            inferred_abstraction: None,
            member: Some(member),
            line,
        }
    }

    pub fn built(
        callee: impl Into<String>,
        inferred_abstraction: Option<String>,
        scope: Scope,
        line: u32,
    ) -> Self {
        Self {
            kind: DependencyKind::Built,
            owner: ModuleId::DETACHED,
            display_text: callee.into(),
            scope,
            inferred_abstraction,
            member: None,
            line,
        }
    }

    /// The abstraction this record stands for: a property requirement's type,
    /// or a built dependency's inferred abstraction. Function requirements
    /// have none.
    pub fn abstraction_text(&self) -> Option<&str> {
        match self.kind {
            DependencyKind::Required => self
                .member
                .as_ref()
                .filter(|m| m.kind == MemberKind::Property)
                .map(|_| self.display_text.as_str()),
            DependencyKind::Built => self.inferred_abstraction.as_deref(),
        }
    }

    /// Equality ignoring owner and line, used to keep merges idempotent.
    pub(crate) fn same_fact(&self, other: &Dependency) -> bool {
        self.kind == other.kind
            && self.display_text == other.display_text
            && self.scope == other.scope
            && self.inferred_abstraction == other.inferred_abstraction
            && self.member.as_ref().map(|m| &m.name) == other.member.as_ref().map(|m| &m.name)
    }
}

/// A raw, unresolved reference to a child module by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildReference {
    pub name: String,
    pub scope: Scope,
    pub line: u32,
}

/// One builder-rooted unit of composition.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    name: String,
    /// Module key the builder was registered under (usually its dependency protocol).
    pub key: String,
    pub source_file: PathBuf,
    pub component_name: Option<String>,
    pub non_core_component_name: Option<String>,
    /// Non-core companion components merged into this module.
    pub non_core_components: Vec<String>,
    pub required_dependencies: Vec<Dependency>,
    pub built_dependencies: Vec<Dependency>,
    pub child_references: Vec<ChildReference>,
    pub(crate) children: Vec<ModuleId>,
    pub(crate) parent: Option<ModuleId>,
}

impl Module {
    pub fn new(name: impl Into<String>, key: impl Into<String>, source_file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            source_file: source_file.into(),
            component_name: None,
            non_core_component_name: None,
            non_core_components: Vec::new(),
            required_dependencies: Vec::new(),
            built_dependencies: Vec::new(),
            child_references: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Declared builder type name. Fixed at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved children, in link order.
    pub fn children(&self) -> &[ModuleId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ModuleId> {
        self.parent
    }

    /// All dependencies, required first.
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.required_dependencies
            .iter()
            .chain(self.built_dependencies.iter())
    }

    /// Add a required dependency unless an equal one is present.
    pub(crate) fn add_required(&mut self, dep: Dependency) -> bool {
        push_unique(&mut self.required_dependencies, dep)
    }

    /// Add a built dependency unless an equal one is present.
    pub(crate) fn add_built(&mut self, dep: Dependency) -> bool {
        push_unique(&mut self.built_dependencies, dep)
    }

    pub(crate) fn add_child_reference(&mut self, reference: ChildReference) -> bool {
        let exists = self
            .child_references
            .iter()
            .any(|r| r.name == reference.name && r.scope == reference.scope);
        if !exists {
            self.child_references.push(reference);
        }
        !exists
    }

    /// Stamp the owner id on every dependency record.
    pub(crate) fn assign_owner(&mut self, id: ModuleId) {
        for dep in self
            .required_dependencies
            .iter_mut()
            .chain(self.built_dependencies.iter_mut())
        {
            dep.owner = id;
        }
    }
}

fn push_unique(list: &mut Vec<Dependency>, dep: Dependency) -> bool {
    if list.iter().any(|d| d.same_fact(&dep)) {
        return false;
    }
    list.push(dep);
    true
}
