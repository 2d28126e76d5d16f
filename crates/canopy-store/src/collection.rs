//! The module tree builder.
//!
//! [`ModuleCollection`] turns a nested [`ModuleDefinition`] into a tree of
//! [`ModuleRecord`]s stored in an arena and addressed by [`ModuleId`]. The
//! tree is isomorphic to the definition tree and grows in place when modules
//! are registered after construction.
//!
//! # Invariants
//!
//! - There is at most one root record, and it has the empty path.
//! - Every other reachable record has exactly one path of child names from
//!   the root.
//! - Children keep registration order; re-registering a name replaces the
//!   record at that key without moving it.

use std::rc::Rc;

use serde_json::Value;

use crate::definition::ModuleDefinition;
use crate::error::{Result, StoreError};
use crate::path::{validate_module_name, ModulePath};

/// Index of a record in the [`ModuleCollection`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

/// Where a record's state slice lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SliceState {
    /// Not installed yet: the definition's initial state.
    Detached(Value),
    /// Grafted into the state tree at the record's path. The tree is the only
    /// owner from here on.
    Live,
}

/// One module in the tree.
#[derive(Clone, Debug)]
pub struct ModuleRecord {
    raw: Rc<ModuleDefinition>,
    state: SliceState,
    children: Vec<(String, ModuleId)>,
}

impl ModuleRecord {
    fn new(raw: Rc<ModuleDefinition>) -> Self {
        let state = SliceState::Detached(raw.state().clone());
        Self {
            raw,
            state,
            children: Vec::new(),
        }
    }

    /// The definition this record was built from (shared, not copied).
    pub fn raw(&self) -> &Rc<ModuleDefinition> {
        &self.raw
    }

    pub fn state(&self) -> &SliceState {
        &self.state
    }

    /// Returns `true` once the record's slice is grafted into the tree.
    pub fn is_live(&self) -> bool {
        matches!(self.state, SliceState::Live)
    }

    pub fn is_namespaced(&self) -> bool {
        self.raw.is_namespaced()
    }

    /// Child records in registration order.
    pub fn children(&self) -> impl Iterator<Item = (&str, ModuleId)> + '_ {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// The child registered under `name`.
    pub fn child(&self, name: &str) -> Option<ModuleId> {
        self.children
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, id)| *id)
    }
}

/// Arena of module records rooted at a single root module.
#[derive(Clone, Debug, Default)]
pub struct ModuleCollection {
    records: Vec<ModuleRecord>,
    root: Option<ModuleId>,
}

impl ModuleCollection {
    /// Create an empty collection with no root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a root definition and all its descendants.
    pub fn from_root(root: Rc<ModuleDefinition>) -> Result<Self> {
        let mut collection = Self::new();
        collection.register(&ModulePath::root(), root)?;
        Ok(collection)
    }

    /// The root record, if one is registered.
    pub fn root(&self) -> Option<ModuleId> {
        self.root
    }

    /// Borrow a record. Ids are only minted by this collection.
    pub fn record(&self, id: ModuleId) -> &ModuleRecord {
        &self.records[id.0]
    }

    /// Look up the record at `path`.
    pub fn get(&self, path: &ModulePath) -> Option<ModuleId> {
        path.segments()
            .iter()
            .try_fold(self.root?, |current, segment| self.record(current).child(segment))
    }

    /// Resolve the parent of `path`, which must not be the root path.
    pub fn parent_of(&self, path: &ModulePath) -> Result<ModuleId> {
        let parent = path.parent().unwrap_or_default();
        self.get(&parent).ok_or_else(|| StoreError::UnknownParent {
            path: path.to_string(),
            parent: parent.to_string(),
        })
    }

    /// Register `definition` at `path`, then its children recursively.
    ///
    /// The empty path installs the root and fails with
    /// [`StoreError::DuplicateRoot`] if one exists. Any other path attaches the
    /// new record under its parent, replacing a previous record with the same
    /// name. Returns the id of the new record.
    pub fn register(&mut self, path: &ModulePath, definition: Rc<ModuleDefinition>) -> Result<ModuleId> {
        let parent = match path.last() {
            None => {
                if self.root.is_some() {
                    return Err(StoreError::DuplicateRoot);
                }
                None
            }
            Some(name) => {
                validate_module_name(name)?;
                Some((self.parent_of(path)?, name.to_string()))
            }
        };

        let id = ModuleId(self.records.len());
        self.records.push(ModuleRecord::new(Rc::clone(&definition)));

        match parent {
            None => self.root = Some(id),
            Some((parent, name)) => {
                let children = &mut self.records[parent.0].children;
                match children.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(entry) => entry.1 = id,
                    None => children.push((name, id)),
                }
            }
        }

        for (name, child) in definition.modules() {
            self.register(&path.child(name), Rc::clone(child))?;
        }
        Ok(id)
    }

    /// Mark a record's slice as grafted into the state tree.
    pub fn mark_live(&mut self, id: ModuleId) {
        self.records[id.0].state = SliceState::Live;
    }

    /// Every reachable module path, depth-first in registration order.
    pub fn paths(&self) -> Vec<ModulePath> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_paths(root, ModulePath::root(), &mut out);
        }
        out
    }

    fn collect_paths(&self, id: ModuleId, path: ModulePath, out: &mut Vec<ModulePath>) {
        let children: Vec<(&str, ModuleId)> = self.record(id).children().collect();
        out.push(path.clone());
        for (name, child) in children {
            self.collect_paths(child, path.child(name), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(age: &str) -> ModuleDefinition {
        ModuleDefinition::new(json!({ "age": age }))
    }

    fn nested() -> Rc<ModuleDefinition> {
        Rc::new(
            ModuleDefinition::new(json!({"num": 22}))
                .module("a", leaf("a100").namespaced(true))
                .module(
                    "b",
                    leaf("b100")
                        .namespaced(true)
                        .module("c", leaf("c100").namespaced(true).module("d", leaf("d100"))),
                ),
        )
    }

    #[test]
    fn builds_isomorphic_tree() {
        let modules = ModuleCollection::from_root(nested()).unwrap();
        let paths: Vec<String> = modules.paths().iter().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["<root>", "a", "b", "b/c", "b/c/d"]);
    }

    #[test]
    fn lookup_by_path() {
        let modules = ModuleCollection::from_root(nested()).unwrap();
        let c = modules.get(&ModulePath::from(["b", "c"])).unwrap();
        assert_eq!(
            modules.record(c).state(),
            &SliceState::Detached(json!({"age": "c100"}))
        );
        assert!(modules.get(&ModulePath::from(["b", "x"])).is_none());
    }

    #[test]
    fn raw_is_shared_not_copied() {
        let root = nested();
        let modules = ModuleCollection::from_root(Rc::clone(&root)).unwrap();
        let record = modules.record(modules.root().unwrap());
        assert!(Rc::ptr_eq(record.raw(), &root));
    }

    #[test]
    fn second_root_is_rejected() {
        let mut modules = ModuleCollection::from_root(nested()).unwrap();
        let err = modules
            .register(&ModulePath::root(), Rc::new(ModuleDefinition::default()))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateRoot));
    }

    #[test]
    fn missing_parent_is_rejected() {
        let mut modules = ModuleCollection::from_root(nested()).unwrap();
        let before = modules.paths().len();
        let err = modules
            .register(&ModulePath::from(["x", "y"]), Rc::new(leaf("y")))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownParent { .. }));
        assert_eq!(modules.paths().len(), before);
    }

    #[test]
    fn invalid_name_is_rejected() {
        let mut modules = ModuleCollection::from_root(nested()).unwrap();
        let err = modules
            .register(&ModulePath::from("bad name"), Rc::new(leaf("x")))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidModuleName { .. }));
    }

    #[test]
    fn re_registering_overwrites_in_place() {
        let mut modules = ModuleCollection::from_root(nested()).unwrap();
        let old = modules.get(&ModulePath::from("a")).unwrap();
        let new = modules
            .register(&ModulePath::from("a"), Rc::new(leaf("a200")))
            .unwrap();

        assert_ne!(old, new);
        assert_eq!(modules.get(&ModulePath::from("a")), Some(new));
        let paths: Vec<String> = modules.paths().iter().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["<root>", "a", "b", "b/c", "b/c/d"]);
    }

    #[test]
    fn dynamic_registration_extends_tree() {
        let mut modules = ModuleCollection::from_root(nested()).unwrap();
        modules
            .register(
                &ModulePath::from(["b", "c", "d"]).child("e"),
                Rc::new(leaf("e100").module("f", leaf("f100"))),
            )
            .unwrap();
        assert!(modules.get(&ModulePath::from(["b", "c", "d", "e", "f"])).is_some());
    }

    #[test]
    fn mark_live() {
        let mut modules = ModuleCollection::from_root(nested()).unwrap();
        let a = modules.get(&ModulePath::from("a")).unwrap();
        assert!(!modules.record(a).is_live());
        modules.mark_live(a);
        assert!(modules.record(a).is_live());
    }
}
