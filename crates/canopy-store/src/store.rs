//! The store facade.
//!
//! [`Store`] owns the reactive state tree, the module tree, the dispatch
//! tables, and the subscriber list. `commit` is the only sanctioned way to
//! change state: it runs every handler registered under a qualified name with
//! the commit-tracking flag held, and notifies subscribers after each one.
//!
//! The store is single-threaded. The commit flag is a plain `Cell<bool>` that
//! is saved and restored around every commit, so nested commits compose.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use canopy_reactive::{ObservableTree, ReactiveTree, WatchId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::collection::ModuleCollection;
use crate::config::StoreConfig;
use crate::definition::ModuleDefinition;
use crate::error::{Result, StoreError};
use crate::installer::{self, ActionEntry, GetterEntry, MutationEntry};
use crate::namespace::resolve_namespace;
use crate::path::ModulePath;
use crate::plugin::Plugin;
use crate::strict::{self, StrictModeViolation};

/// What subscribers are told about each mutation handler invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// The qualified mutation name.
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

/// Called after every mutation handler with the record and the whole state.
pub type Subscriber = Rc<dyn Fn(&MutationRecord, &Value)>;

/// Handle returned by [`Store::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub(crate) struct StoreInner {
    pub(crate) config: StoreConfig,
    pub(crate) tree: Rc<dyn ObservableTree>,
    pub(crate) modules: RefCell<ModuleCollection>,
    pub(crate) getters: RefCell<BTreeMap<String, GetterEntry>>,
    pub(crate) mutations: RefCell<HashMap<String, Vec<MutationEntry>>>,
    pub(crate) actions: RefCell<HashMap<String, Vec<ActionEntry>>>,
    pub(crate) subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    pub(crate) next_subscription: Cell<u64>,
    pub(crate) committing: Cell<bool>,
    pub(crate) violations: RefCell<Vec<StrictModeViolation>>,
    pub(crate) strict_watch: Cell<Option<WatchId>>,
}

/// Restores the commit flag to its prior value when dropped, including on
/// early return and unwinding.
struct CommitGuard<'a> {
    flag: &'a Cell<bool>,
    prior: bool,
}

impl<'a> CommitGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let prior = flag.replace(true);
        Self { flag, prior }
    }
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.prior);
    }
}

/// A hierarchical state container.
///
/// `Store` is a cheap handle; clones share the same state. Subscribers or
/// plugins that capture a clone keep the store alive for as long as they are
/// registered.
///
/// ```
/// use canopy_store::{ModuleDefinition, Store};
/// use serde_json::json;
///
/// let store = Store::new(
///     ModuleDefinition::new(json!({"num": 22}))
///         .mutation("addNum", |state, payload| {
///             let num = state["num"].as_i64().unwrap_or(0) + payload.as_i64().unwrap_or(0);
///             state["num"] = json!(num);
///         }),
/// )
/// .unwrap();
///
/// store.commit("addNum", json!(3)).unwrap();
/// assert_eq!(store.state_at(&["num"]), Some(json!(25)));
/// ```
#[derive(Clone)]
pub struct Store {
    pub(crate) inner: Rc<StoreInner>,
}

impl Store {
    /// Build a store with the default configuration and no plugins.
    pub fn new(root: ModuleDefinition) -> Result<Self> {
        Self::builder(root).build()
    }

    /// Start configuring a store around `root`.
    pub fn builder(root: ModuleDefinition) -> StoreBuilder {
        StoreBuilder::new(root)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// The reactive tree backing this store.
    pub fn tree(&self) -> Rc<dyn ObservableTree> {
        Rc::clone(&self.inner.tree)
    }

    // ---- State ----

    /// A snapshot of the whole state tree.
    pub fn state(&self) -> Value {
        self.inner.tree.snapshot()
    }

    /// The value at a key path, e.g. `&["b", "c", "age"]`.
    pub fn state_at<S: AsRef<str>>(&self, path: &[S]) -> Option<Value> {
        self.inner.tree.get(&owned(path))
    }

    /// Write a value directly, bypassing `commit`.
    ///
    /// This is the path strict mode exists to catch: outside a commit the
    /// write is reported as a [`StrictModeViolation`].
    pub fn set_state<S: AsRef<str>>(&self, path: &[S], value: Value) -> Result<()> {
        self.inner.tree.set(&owned(path), value)?;
        Ok(())
    }

    /// Swap the whole state tree. Runs under the commit flag.
    pub fn replace_state(&self, state: Value) {
        self.with_commit(|| self.inner.tree.replace(state));
        debug!("state replaced");
    }

    // ---- Getters ----

    /// Evaluate a getter against the current state of its module.
    pub fn getter(&self, name: &str) -> Result<Value> {
        let entry = self
            .inner
            .getters
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownGetter {
                name: name.to_string(),
            })?;

        let mut value = Value::Null;
        self.inner
            .tree
            .read(entry.path.segments(), &mut |local| value = (entry.func)(local))?;
        Ok(value)
    }

    /// Qualified names of every getter, sorted.
    pub fn getter_names(&self) -> Vec<String> {
        self.inner.getters.borrow().keys().cloned().collect()
    }

    // ---- Mutations ----

    /// Run every mutation registered under `name`, in registration order.
    ///
    /// Subscribers are notified after each handler. The commit flag is held
    /// for the whole call and restored afterwards.
    pub fn commit(&self, name: &str, payload: Value) -> Result<()> {
        let handlers = self
            .inner
            .mutations
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownMutation {
                name: name.to_string(),
            })?;

        if self.inner.config.log_commits {
            debug!(mutation = name, handlers = handlers.len(), %payload, "commit");
        }

        self.with_commit(|| {
            handlers
                .iter()
                .try_for_each(|handler| self.apply_mutation(handler, &payload))
        })
    }

    fn apply_mutation(&self, handler: &MutationEntry, payload: &Value) -> Result<()> {
        self.inner
            .tree
            .update(handler.path.segments(), &mut |local| (handler.func)(local, payload))?;

        let record = MutationRecord {
            kind: handler.kind.clone(),
            payload: payload.clone(),
        };
        self.notify(&record);
        Ok(())
    }

    fn notify(&self, record: &MutationRecord) {
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect();
        if subscribers.is_empty() {
            return;
        }
        let state = self.state();
        for subscriber in subscribers {
            subscriber(record, &state);
        }
    }

    /// Returns `true` if any module registered mutation `name`.
    pub fn has_mutation(&self, name: &str) -> bool {
        self.inner.mutations.borrow().contains_key(name)
    }

    /// Number of handlers registered under mutation `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        self.inner
            .mutations
            .borrow()
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Qualified names of every mutation, sorted.
    pub fn mutation_names(&self) -> Vec<String> {
        sorted_keys(&self.inner.mutations.borrow())
    }

    // ---- Actions ----

    /// Run every action registered under `name`, in registration order.
    ///
    /// Returns once every handler has been invoked. Work an action schedules
    /// asynchronously is not awaited. The commit flag is untouched: commits
    /// made by the action are tracked individually.
    pub fn dispatch(&self, name: &str, payload: Value) -> Result<()> {
        let handlers = self
            .inner
            .actions
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownAction {
                name: name.to_string(),
            })?;

        if self.inner.config.log_commits {
            debug!(action = name, handlers = handlers.len(), %payload, "dispatch");
        }

        for handler in &handlers {
            (handler.func)(self, &payload).inspect_err(|e| {
                debug!(action = %handler.kind, error = %e, "action failed");
            })?;
        }
        Ok(())
    }

    /// Returns `true` if any module registered action `name`.
    pub fn has_action(&self, name: &str) -> bool {
        self.inner.actions.borrow().contains_key(name)
    }

    /// Qualified names of every action, sorted.
    pub fn action_names(&self) -> Vec<String> {
        sorted_keys(&self.inner.actions.borrow())
    }

    // ---- Modules ----

    /// Register and install a module after construction.
    ///
    /// A single name is a top-level module; a path nests the module under an
    /// existing one. Runs under the commit flag, so grafting the new slice is
    /// not a strict-mode violation.
    pub fn register_module(
        &self,
        path: impl Into<ModulePath>,
        definition: ModuleDefinition,
    ) -> Result<()> {
        let path = path.into();
        self.with_commit(|| installer::register(&self.inner, &path, Rc::new(definition)))?;
        info!(module = %path, "module registered");
        Ok(())
    }

    /// The namespace prefix of the module at `path`.
    pub fn module_namespace(&self, path: impl Into<ModulePath>) -> Result<String> {
        resolve_namespace(&self.inner.modules.borrow(), &path.into())
    }

    /// Every installed module path, depth-first in registration order.
    pub fn module_paths(&self) -> Vec<ModulePath> {
        self.inner.modules.borrow().paths()
    }

    // ---- Subscribers ----

    /// Register a subscriber called after every mutation handler.
    pub fn subscribe(&self, subscriber: impl Fn(&MutationRecord, &Value) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    // ---- Commit tracking ----

    /// Whether a commit (or `replace_state`/`register_module`) is running.
    pub fn is_committing(&self) -> bool {
        self.inner.committing.get()
    }

    /// Run `f` with the commit flag held, restoring the prior value after.
    pub(crate) fn with_commit<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = CommitGuard::enter(&self.inner.committing);
        f()
    }

    /// Every strict-mode violation observed so far.
    pub fn strict_violations(&self) -> Vec<StrictModeViolation> {
        self.inner.violations.borrow().clone()
    }

    /// Whether the strict-mode watcher is attached.
    pub fn is_strict(&self) -> bool {
        self.inner.strict_watch.get().is_some()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state())
            .field("modules", &self.module_paths().len())
            .field("mutations", &self.inner.mutations.borrow().len())
            .field("actions", &self.inner.actions.borrow().len())
            .field("getters", &self.inner.getters.borrow().len())
            .field("strict", &self.is_strict())
            .finish()
    }
}

fn owned<S: AsRef<str>>(path: &[S]) -> Vec<String> {
    path.iter().map(|segment| segment.as_ref().to_string()).collect()
}

fn sorted_keys<T>(table: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = table.keys().cloned().collect();
    keys.sort();
    keys
}

// ---------------------------------------------------------------------------
// StoreBuilder
// ---------------------------------------------------------------------------

/// Configures and builds a [`Store`].
pub struct StoreBuilder {
    root: ModuleDefinition,
    config: StoreConfig,
    plugins: Vec<Box<dyn Plugin>>,
    tree: Option<Rc<dyn ObservableTree>>,
}

impl StoreBuilder {
    pub fn new(root: ModuleDefinition) -> Self {
        Self {
            root,
            config: StoreConfig::default(),
            plugins: Vec::new(),
            tree: None,
        }
    }

    /// Enable or disable strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a plugin. Plugins run once, in the order added, after installation.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Host the state in `tree` instead of a fresh [`ReactiveTree`]. The
    /// tree's root is replaced by the root module's state.
    pub fn tree(mut self, tree: Rc<dyn ObservableTree>) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Build the module tree, install it, apply plugins, and attach the
    /// strict-mode watcher if enabled.
    pub fn build(self) -> Result<Store> {
        let root = Rc::new(self.root);
        let tree = match self.tree {
            Some(tree) => {
                tree.replace(root.state().clone());
                tree
            }
            None => Rc::new(ReactiveTree::new(root.state().clone())) as Rc<dyn ObservableTree>,
        };

        let store = Store {
            inner: Rc::new(StoreInner {
                config: self.config,
                tree,
                modules: RefCell::new(ModuleCollection::new()),
                getters: RefCell::new(BTreeMap::new()),
                mutations: RefCell::new(HashMap::new()),
                actions: RefCell::new(HashMap::new()),
                subscribers: RefCell::new(Vec::new()),
                next_subscription: Cell::new(0),
                committing: Cell::new(false),
                violations: RefCell::new(Vec::new()),
                strict_watch: Cell::new(None),
            }),
        };

        store.with_commit(|| installer::register(&store.inner, &ModulePath::root(), root))?;

        for plugin in &self.plugins {
            debug!(plugin = plugin.name(), "applying plugin");
            plugin.apply(&store).map_err(|e| match e {
                StoreError::Plugin { .. } => e,
                other => StoreError::plugin(plugin.name(), other.to_string()),
            })?;
        }

        if store.inner.config.strict {
            let id = strict::enable(&store);
            store.inner.strict_watch.set(Some(id));
        }

        info!(
            modules = store.module_paths().len(),
            mutations = store.inner.mutations.borrow().len(),
            actions = store.inner.actions.borrow().len(),
            getters = store.inner.getters.borrow().len(),
            plugins = self.plugins.len(),
            strict = store.inner.config.strict,
            "store built"
        );
        Ok(store)
    }
}
