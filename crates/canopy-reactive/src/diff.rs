//! Structural diff between two JSON state values.
//!
//! Nested objects are walked key by key; every other value (scalars and
//! arrays alike) is compared as a leaf. Each change carries the full path of
//! the key it affects, so a diff taken at `["b", "c"]` reports paths starting
//! with `b.c`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::path::display_path;

/// The result of comparing two state values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateDiff {
    /// The list of state changes, in traversal order.
    pub changes: Vec<StateChange>,
}

impl StateDiff {
    /// Create an empty state diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of added keys.
    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, StateChange::Added { .. }))
            .count()
    }

    /// Number of removed keys.
    pub fn removals(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, StateChange::Removed { .. }))
            .count()
    }

    /// Number of modified values.
    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, StateChange::Modified { .. }))
            .count()
    }

    /// The rendered path of every change, e.g. `["b.c.age"]`.
    pub fn paths(&self) -> Vec<String> {
        self.changes.iter().map(|c| display_path(c.path())).collect()
    }
}

/// A single change between two state values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StateChange {
    /// A new key was added.
    Added { path: Vec<String>, value: Value },
    /// An existing key was removed.
    Removed { path: Vec<String>, value: Value },
    /// A leaf value changed.
    Modified {
        path: Vec<String>,
        old: Value,
        new: Value,
    },
}

impl StateChange {
    /// Full path of the affected key.
    pub fn path(&self) -> &[String] {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { path, value } => write!(f, "+ {} = {value}", display_path(path)),
            Self::Removed { path, value } => write!(f, "- {} (was {value})", display_path(path)),
            Self::Modified { path, old, new } => {
                write!(f, "~ {}: {old} -> {new}", display_path(path))
            }
        }
    }
}

/// Compute the diff between two values rooted at the empty path.
pub fn diff_values(old: &Value, new: &Value) -> StateDiff {
    diff_at(&[], old, new)
}

/// Compute the diff between two values that live at `base` in a larger tree.
pub fn diff_at(base: &[String], old: &Value, new: &Value) -> StateDiff {
    let mut prefix = base.to_vec();
    let mut changes = Vec::new();
    walk(&mut prefix, old, new, &mut changes);
    StateDiff { changes }
}

fn walk(prefix: &mut Vec<String>, old: &Value, new: &Value, out: &mut Vec<StateChange>) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            // Removed and changed keys, in the old map's order.
            for (key, old_val) in old_map {
                prefix.push(key.clone());
                match new_map.get(key) {
                    Some(new_val) => walk(prefix, old_val, new_val, out),
                    None => out.push(StateChange::Removed {
                        path: prefix.clone(),
                        value: old_val.clone(),
                    }),
                }
                prefix.pop();
            }

            for (key, new_val) in new_map {
                if !old_map.contains_key(key) {
                    let mut path = prefix.clone();
                    path.push(key.clone());
                    out.push(StateChange::Added {
                        path,
                        value: new_val.clone(),
                    });
                }
            }
        }
        _ if old != new => out.push(StateChange::Modified {
            path: prefix.clone(),
            old: old.clone(),
            new: new.clone(),
        }),
        _ => {}
    }
}
