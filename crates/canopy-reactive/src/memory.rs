//! In-memory observable tree.
//!
//! [`ReactiveTree`] keeps the whole document in a `RefCell<Value>`. Updates
//! snapshot the targeted slice, run the caller's closure, and diff the result,
//! which gives deep observation of arbitrarily nested writes without
//! instrumenting individual properties.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::diff::{diff_at, StateChange, StateDiff};
use crate::error::{Result, TreeError};
use crate::path::{display_path, resolve, resolve_mut};
use crate::traits::{ChangeOrigin, ObservableTree, TreeChange, WatchId, Watcher};

/// An in-memory implementation of [`ObservableTree`].
pub struct ReactiveTree {
    root: RefCell<Value>,
    watchers: RefCell<Vec<(WatchId, Watcher)>>,
    next_watch: Cell<u64>,
}

impl ReactiveTree {
    /// Create a tree holding `root`.
    pub fn new(root: Value) -> Self {
        Self {
            root: RefCell::new(root),
            watchers: RefCell::new(Vec::new()),
            next_watch: Cell::new(0),
        }
    }

    /// Number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }

    fn notify(&self, change: TreeChange) {
        // Clone the list so watchers may register or remove watchers.
        let watchers: Vec<Watcher> = self
            .watchers
            .borrow()
            .iter()
            .map(|(_, watcher)| Rc::clone(watcher))
            .collect();
        trace!(
            origin = ?change.origin,
            path = %display_path(&change.path),
            changes = change.diff.len(),
            watchers = watchers.len(),
            "tree change"
        );
        for watcher in watchers {
            watcher(&change);
        }
    }
}

impl Default for ReactiveTree {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl std::fmt::Debug for ReactiveTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveTree")
            .field("root", &self.root.borrow())
            .field("watchers", &self.watcher_count())
            .finish()
    }
}

impl ObservableTree for ReactiveTree {
    fn snapshot(&self) -> Value {
        self.root.borrow().clone()
    }

    fn read(&self, path: &[String], reader: &mut dyn FnMut(&Value)) -> Result<()> {
        let root = self.root.borrow();
        let value = resolve(&root, path).ok_or_else(|| TreeError::PathNotFound {
            path: display_path(path),
        })?;
        reader(value);
        Ok(())
    }

    fn update(&self, path: &[String], updater: &mut dyn FnMut(&mut Value)) -> Result<StateDiff> {
        let diff = {
            let mut root = self.root.borrow_mut();
            let slot = resolve_mut(&mut root, path).ok_or_else(|| TreeError::PathNotFound {
                path: display_path(path),
            })?;
            let before = slot.clone();
            updater(slot);
            diff_at(path, &before, slot)
        };

        if !diff.is_empty() {
            self.notify(TreeChange {
                origin: ChangeOrigin::Update,
                path: path.to_vec(),
                diff: diff.clone(),
            });
        }
        Ok(diff)
    }

    fn attach(&self, parent: &[String], key: &str, value: Value) -> Result<()> {
        let mut full = parent.to_vec();
        full.push(key.to_string());

        let diff = {
            let mut root = self.root.borrow_mut();
            let node = resolve_mut(&mut root, parent).ok_or_else(|| TreeError::PathNotFound {
                path: display_path(parent),
            })?;
            let object = node.as_object_mut().ok_or_else(|| TreeError::NotAnObject {
                path: display_path(parent),
            })?;
            match object.insert(key.to_string(), value.clone()) {
                Some(previous) => diff_at(&full, &previous, &value),
                None => StateDiff {
                    changes: vec![StateChange::Added {
                        path: full.clone(),
                        value,
                    }],
                },
            }
        };

        self.notify(TreeChange {
            origin: ChangeOrigin::Attach,
            path: full,
            diff,
        });
        Ok(())
    }

    fn replace(&self, root: Value) {
        let diff = {
            let mut current = self.root.borrow_mut();
            let previous = std::mem::replace(&mut *current, root);
            diff_at(&[], &previous, &current)
        };

        self.notify(TreeChange {
            origin: ChangeOrigin::Replace,
            path: Vec::new(),
            diff,
        });
    }

    fn watch(&self, watcher: Watcher) -> WatchId {
        let id = WatchId(self.next_watch.get());
        self.next_watch.set(id.0 + 1);
        self.watchers.borrow_mut().push((id, watcher));
        id
    }

    fn unwatch(&self, id: WatchId) -> bool {
        let mut watchers = self.watchers.borrow_mut();
        let before = watchers.len();
        watchers.retain(|(existing, _)| *existing != id);
        watchers.len() != before
    }
}
