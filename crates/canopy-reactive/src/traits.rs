//! The [`ObservableTree`] trait defining the reactive state interface.
//!
//! The store never touches state directly. Every read, in-place update,
//! graft of a new module slice, and whole-tree replacement goes through this
//! trait, so any backend that can observe nested changes can host a store.

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::diff::StateDiff;
use crate::error::Result;

/// Handle returned by [`ObservableTree::watch`], used to remove the watcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

/// Which tree operation produced a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// An in-place [`update`](ObservableTree::update) or [`set`](ObservableTree::set).
    Update,
    /// A new key defined with [`attach`](ObservableTree::attach).
    Attach,
    /// The whole root swapped with [`replace`](ObservableTree::replace).
    Replace,
}

/// A change notification delivered to deep watchers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeChange {
    /// The operation that caused the change.
    pub origin: ChangeOrigin,
    /// The path the operation targeted.
    pub path: Vec<String>,
    /// Every leaf that changed, with absolute paths.
    pub diff: StateDiff,
}

/// A deep watcher. Called synchronously once per observed change.
pub type Watcher = Rc<dyn Fn(&TreeChange)>;

/// A reactive JSON state tree.
///
/// Implementations are single-threaded and must notify watchers only after
/// releasing any internal borrow, so a watcher may read the tree. Readers and
/// updaters passed to [`read`](Self::read) and [`update`](Self::update) must
/// not re-enter the tree.
pub trait ObservableTree {
    /// A deep copy of the whole tree.
    fn snapshot(&self) -> Value;

    /// Borrow the value at `path`.
    fn read(&self, path: &[String], reader: &mut dyn FnMut(&Value)) -> Result<()>;

    /// Mutate the value at `path` in place.
    ///
    /// Watchers are notified when the update changed anything. Returns the
    /// diff that was observed.
    fn update(&self, path: &[String], updater: &mut dyn FnMut(&mut Value)) -> Result<StateDiff>;

    /// Define (or redefine) an observed property `key` on the object at
    /// `parent`. Always notifies watchers.
    fn attach(&self, parent: &[String], key: &str, value: Value) -> Result<()>;

    /// Swap the whole root. Always notifies watchers.
    fn replace(&self, root: Value);

    /// Register a deep, synchronous watcher.
    fn watch(&self, watcher: Watcher) -> WatchId;

    /// Remove a watcher. Returns `false` if it was not registered.
    fn unwatch(&self, id: WatchId) -> bool;

    /// Clone the value at `path`, if any.
    fn get(&self, path: &[String]) -> Option<Value> {
        let mut found = None;
        self.read(path, &mut |value| found = Some(value.clone())).ok()?;
        found
    }

    /// Overwrite the value at `path`. The path must already exist.
    fn set(&self, path: &[String], value: Value) -> Result<StateDiff> {
        let mut value = Some(value);
        self.update(path, &mut |slot| {
            if let Some(value) = value.take() {
                *slot = value;
            }
        })
    }
}
