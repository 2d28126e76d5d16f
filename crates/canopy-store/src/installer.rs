//! The installer: grafts module slices into the state tree and registers
//! namespace-qualified getters, mutations, and actions.
//!
//! Handlers are stored as plain data (module path + user function) rather
//! than closures over the store. The store re-resolves the live slice from
//! the path on every call, so handlers keep working after `replace_state`.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use canopy_reactive::{display_path, TreeError};
use tracing::debug;

use crate::collection::{ModuleId, SliceState};
use crate::definition::{ActionFn, GetterFn, ModuleDefinition, MutationFn};
use crate::error::{Result, StoreError};
use crate::namespace::{qualify, resolve_namespace};
use crate::path::{validate_module_name, ModulePath};
use crate::store::StoreInner;

/// A getter bound to its module's path.
#[derive(Clone)]
pub(crate) struct GetterEntry {
    pub(crate) path: ModulePath,
    pub(crate) func: GetterFn,
}

/// A mutation bound to its module's path and qualified type.
#[derive(Clone)]
pub(crate) struct MutationEntry {
    pub(crate) kind: String,
    pub(crate) path: ModulePath,
    pub(crate) func: MutationFn,
}

/// An action and its qualified type.
#[derive(Clone)]
pub(crate) struct ActionEntry {
    pub(crate) kind: String,
    pub(crate) func: ActionFn,
}

/// Register `definition` at `path` and install the new subtree.
///
/// Everything that can fail is checked before the module tree, the state
/// tree, or the dispatch tables are touched, so a rejected registration
/// leaves the store exactly as it was.
pub(crate) fn register(
    inner: &StoreInner,
    path: &ModulePath,
    definition: Rc<ModuleDefinition>,
) -> Result<()> {
    check(inner, path, &definition)?;
    let id = inner.modules.borrow_mut().register(path, definition)?;
    install(inner, path, id)
}

/// Validate a subtree against the installed store without changing it.
fn check(inner: &StoreInner, path: &ModulePath, definition: &ModuleDefinition) -> Result<()> {
    let namespace = {
        let modules = inner.modules.borrow();
        match path.parent() {
            None => {
                if modules.root().is_some() {
                    return Err(StoreError::DuplicateRoot);
                }
                String::new()
            }
            Some(parent) => {
                modules.parent_of(path)?;
                resolve_namespace(&modules, &parent)?
            }
        }
    };

    if let Some(parent) = path.parent() {
        let mut is_object = false;
        inner
            .tree
            .read(parent.segments(), &mut |slice| is_object = slice.is_object())?;
        if !is_object {
            return Err(TreeError::NotAnObject {
                path: display_path(parent.segments()),
            }
            .into());
        }
    }

    let getters = inner.getters.borrow();
    check_subtree(definition, path, namespace, &getters, &mut BTreeSet::new())
}

fn check_subtree(
    definition: &ModuleDefinition,
    path: &ModulePath,
    namespace: String,
    taken: &BTreeMap<String, GetterEntry>,
    seen: &mut BTreeSet<String>,
) -> Result<()> {
    let namespace = match path.last() {
        Some(name) => {
            validate_module_name(name)?;
            if definition.is_namespaced() {
                format!("{namespace}{name}/")
            } else {
                namespace
            }
        }
        None => namespace,
    };

    for (name, _) in definition.getters() {
        let qualified = qualify(&namespace, name);
        if taken.contains_key(&qualified) || !seen.insert(qualified.clone()) {
            return Err(StoreError::DuplicateGetter { name: qualified });
        }
    }

    if !definition.modules().is_empty() && !definition.state().is_object() {
        return Err(TreeError::NotAnObject {
            path: display_path(path.segments()),
        }
        .into());
    }

    for (name, child) in definition.modules() {
        check_subtree(child, &path.child(name), namespace.clone(), taken, seen)?;
    }
    Ok(())
}

/// Install the record `id` found at `path`, then its children in
/// registration order.
///
/// No `RefCell` borrow is held across a tree operation, because tree
/// watchers run synchronously and may call back into the store.
fn install(inner: &StoreInner, path: &ModulePath, id: ModuleId) -> Result<()> {
    let (namespace, raw, initial) = {
        let modules = inner.modules.borrow();
        let record = modules.record(id);
        let initial = match record.state() {
            SliceState::Detached(value) => Some(value.clone()),
            SliceState::Live => None,
        };
        (resolve_namespace(&modules, path)?, Rc::clone(record.raw()), initial)
    };

    if let (Some(key), Some(parent)) = (path.last(), path.parent()) {
        let state = initial.unwrap_or_else(|| raw.state().clone());
        inner.tree.attach(parent.segments(), key, state)?;
    }
    inner.modules.borrow_mut().mark_live(id);

    {
        let mut getters = inner.getters.borrow_mut();
        for (name, func) in raw.getters() {
            let qualified = qualify(&namespace, name);
            if getters.contains_key(&qualified) {
                return Err(StoreError::DuplicateGetter { name: qualified });
            }
            getters.insert(
                qualified,
                GetterEntry {
                    path: path.clone(),
                    func: Rc::clone(func),
                },
            );
        }
    }

    {
        let mut mutations = inner.mutations.borrow_mut();
        for (name, func) in raw.mutations() {
            let qualified = qualify(&namespace, name);
            mutations
                .entry(qualified.clone())
                .or_default()
                .push(MutationEntry {
                    kind: qualified,
                    path: path.clone(),
                    func: Rc::clone(func),
                });
        }
    }

    {
        let mut actions = inner.actions.borrow_mut();
        for (name, func) in raw.actions() {
            let qualified = qualify(&namespace, name);
            actions.entry(qualified.clone()).or_default().push(ActionEntry {
                kind: qualified,
                func: Rc::clone(func),
            });
        }
    }

    debug!(
        module = %path,
        namespace = %namespace,
        getters = raw.getters().len(),
        mutations = raw.mutations().len(),
        actions = raw.actions().len(),
        "module installed"
    );

    let children: Vec<(String, ModuleId)> = inner
        .modules
        .borrow()
        .record(id)
        .children()
        .map(|(name, child)| (name.to_string(), child))
        .collect();
    for (name, child) in children {
        install(inner, &path.child(&name), child)?;
    }
    Ok(())
}
