//! The flat module arena accumulated during a scan.

use super::types::{Module, ModuleId};

/// All modules of one scan, addressed by [`ModuleId`].
///
/// Only the scan reducer appends to it; ids are never reused or reordered.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    modules: Vec<Module>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module and stamp its id on every dependency it owns.
    pub fn insert(&mut self, mut module: Module) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        module.assign_owner(id);
        self.modules.push(module);
        id
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: ModuleId) -> Option<&mut Module> {
        self.modules.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, m)| (ModuleId(i as u32), m))
    }

    /// Ids of every module called `name`, in insertion order.
    pub fn ids_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ModuleId> + 'a {
        self.iter()
            .filter(move |(_, m)| m.name() == name)
            .map(|(id, _)| id)
    }

    /// First module whose recorded non-core companion is `component`.
    pub fn find_by_non_core_component(&self, component: &str) -> Option<ModuleId> {
        self.iter()
            .find(|(_, m)| m.non_core_component_name.as_deref() == Some(component))
            .map(|(id, _)| id)
    }

    pub(crate) fn into_modules(self) -> Vec<Module> {
        self.modules
    }
}

impl FromIterator<Module> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        let mut set = ModuleSet::new();
        for module in iter {
            set.insert(module);
        }
        set
    }
}
