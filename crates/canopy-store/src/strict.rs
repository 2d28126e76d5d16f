//! Strict mode: flag every state change that happens outside a commit.
//!
//! The watcher is deep and synchronous, so it runs while the offending write
//! is still on the stack and the commit flag still reflects that write.

use std::rc::Rc;

use canopy_reactive::{display_path, ChangeOrigin, TreeChange, WatchId};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::config::ViolationPolicy;
use crate::store::Store;

/// A state change observed while no commit was running.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
#[error("state changed outside a mutation handler: {origin:?} at {target} ({} leaves)", .paths.len())]
pub struct StrictModeViolation {
    /// The tree operation that made the change.
    pub origin: ChangeOrigin,
    /// The path the operation targeted, `<root>` for the whole tree.
    pub target: String,
    /// Every leaf that changed.
    pub paths: Vec<String>,
}

impl StrictModeViolation {
    fn from_change(change: &TreeChange) -> Self {
        Self {
            origin: change.origin,
            target: display_path(&change.path),
            paths: change.diff.paths(),
        }
    }
}

/// Attach the strict-mode watcher to the store's tree.
///
/// The watcher holds a weak reference so it never keeps the store alive.
pub(crate) fn enable(store: &Store) -> WatchId {
    let weak = Rc::downgrade(&store.inner);
    store.inner.tree.watch(Rc::new(move |change: &TreeChange| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if inner.committing.get() {
            return;
        }

        let violation = StrictModeViolation::from_change(change);
        warn!(
            origin = ?violation.origin,
            target = %violation.target,
            leaves = violation.paths.len(),
            "strict mode violation"
        );
        inner.violations.borrow_mut().push(violation.clone());

        if inner.config.violation_policy == ViolationPolicy::Panic {
            panic!("{violation}");
        }
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::config::StoreConfig;
    use crate::definition::ModuleDefinition;

    fn strict_store(policy: ViolationPolicy) -> Store {
        let config = StoreConfig {
            violation_policy: policy,
            ..StoreConfig::strict()
        };
        Store::builder(
            ModuleDefinition::new(json!({"num": 22}))
                .mutation("addNum", |state, payload| {
                    let next = state["num"].as_i64().unwrap_or(0) + payload.as_i64().unwrap_or(0);
                    state["num"] = json!(next);
                })
                .module("b", ModuleDefinition::new(json!({"age": "b100"}))),
        )
        .config(config)
        .build()
        .unwrap()
    }

    #[test]
    fn commits_are_clean() {
        let store = strict_store(ViolationPolicy::Report);
        assert!(store.is_strict());
        store.commit("addNum", json!(1)).unwrap();
        assert!(store.strict_violations().is_empty());
    }

    #[test]
    fn direct_write_is_reported() {
        let store = strict_store(ViolationPolicy::Report);
        store.set_state(&["b", "age"], json!("hacked")).unwrap();

        let violations = store.strict_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].origin, ChangeOrigin::Update);
        assert_eq!(violations[0].target, "b.age");
        assert_eq!(violations[0].paths, vec!["b.age"]);
        // Report never blocks the write.
        assert_eq!(store.state_at(&["b", "age"]), Some(json!("hacked")));
    }

    #[test]
    fn replace_state_and_registration_are_sanctioned() {
        let store = strict_store(ViolationPolicy::Report);
        store.replace_state(json!({"num": 1, "b": {"age": "b200"}}));
        store
            .register_module("m", ModuleDefinition::new(json!({"age": "m100"})))
            .unwrap();
        assert!(store.strict_violations().is_empty());
    }

    #[test]
    fn raw_tree_replace_is_reported() {
        let store = strict_store(ViolationPolicy::Report);
        store.tree().replace(json!({}));
        let violations = store.strict_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].origin, ChangeOrigin::Replace);
        assert_eq!(violations[0].target, "<root>");
    }

    #[test]
    #[should_panic(expected = "state changed outside a mutation handler")]
    fn panic_policy_panics() {
        let store = strict_store(ViolationPolicy::Panic);
        let _ = store.set_state(&["num"], Value::from(0));
    }

    #[test]
    fn not_strict_means_no_watcher() {
        let store = Store::new(ModuleDefinition::new(json!({"num": 0}))).unwrap();
        assert!(!store.is_strict());
        store.set_state(&["num"], json!(5)).unwrap();
        assert!(store.strict_violations().is_empty());
    }

    #[test]
    fn violation_display() {
        let violation = StrictModeViolation {
            origin: ChangeOrigin::Update,
            target: "num".into(),
            paths: vec!["num".into()],
        };
        assert_eq!(
            violation.to_string(),
            "state changed outside a mutation handler: Update at num (1 leaves)"
        );
    }
}
