//! Per-file classification output.

use std::path::{Path, PathBuf};

use ribbit_core::types::collections::FxHashMap;
use serde::Serialize;

use crate::syntax::{NodeId, ProtocolMember};

/// A call that passed the instantiation filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFact {
    pub callee: String,
    pub node: NodeId,
    pub line: u32,
}

/// One member of a dependency protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementFact {
    pub member: ProtocolMember,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fact {
    Call(CallFact),
    Requirement(RequirementFact),
}

/// Insertion-ordered string map; inserting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameTable {
    entries: Vec<(String, String)>,
}

impl NameTable {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A constant declared on a plugin point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginConstant {
    pub name: String,
    pub declared_type: Option<String>,
}

/// What a `*PluginPoint` declaration exposes. Collected, not linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginPointFacts {
    pub name: String,
    pub file: PathBuf,
    /// First generic argument of the plugin point base type.
    pub dependency: Option<String>,
    pub constants: Vec<PluginConstant>,
    /// Declared type of the `pluginFactories` variable.
    pub factory_type: Option<String>,
}

/// Everything the classifier learned from one file.
#[derive(Debug, Clone, Default)]
pub struct FileFacts {
    pub path: PathBuf,
    /// Declaration name to its facts in document order.
    pub by_name: FxHashMap<String, Vec<Fact>>,
    /// Module key to `Builder` declaration name.
    pub builder_names: NameTable,
    /// Module key to pluginized / needle builder declaration name.
    pub pluginized_builder_names: NameTable,
    /// Module key to component declaration name.
    pub component_names: NameTable,
    /// Component declaration name to its non-core companion type.
    pub non_core_component_names: NameTable,
    /// Dependency protocols in declaration order.
    pub dependency_names: Vec<String>,
    pub plugin_points: Vec<PluginPointFacts>,
}

impl FileFacts {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn facts_for(&self, name: &str) -> &[Fact] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Calls recorded under `name`.
    pub fn calls_for<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CallFact> + 'a {
        self.facts_for(name).iter().filter_map(|f| match f {
            Fact::Call(c) => Some(c),
            Fact::Requirement(_) => None,
        })
    }

    /// Protocol requirements recorded under `name`.
    pub fn requirements_for<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a RequirementFact> + 'a {
        self.facts_for(name).iter().filter_map(|f| match f {
            Fact::Requirement(r) => Some(r),
            Fact::Call(_) => None,
        })
    }

    pub fn is_dependency_protocol(&self, name: &str) -> bool {
        self.dependency_names.iter().any(|d| d == name)
    }

    /// True when nothing in the file was classified.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty() && self.dependency_names.is_empty() && self.plugin_points.is_empty()
    }
}
