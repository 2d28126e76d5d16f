//! The plugin contract.
//!
//! A plugin is applied exactly once, after the module tree is installed and
//! before the strict-mode watcher is attached. It receives the store handle
//! and typically subscribes to mutations or seeds state.

use crate::error::Result;
use crate::store::Store;

/// Extends a store at construction time.
///
/// Plugins run in the order they were added to the
/// [`StoreBuilder`](crate::StoreBuilder). An error aborts construction.
pub trait Plugin {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Hook into `store`.
    fn apply(&self, store: &Store) -> Result<()>;
}

/// A plugin backed by a closure. Built with [`plugin_fn`].
pub struct FnPlugin<F> {
    name: String,
    f: F,
}

impl<F> Plugin for FnPlugin<F>
where
    F: Fn(&Store) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, store: &Store) -> Result<()> {
        (self.f)(store)
    }
}

/// Adapt a closure into a [`Plugin`].
///
/// ```
/// use canopy_store::{plugin_fn, ModuleDefinition, Store};
/// use serde_json::json;
///
/// let store = Store::builder(ModuleDefinition::new(json!({"ready": false})))
///     .plugin(plugin_fn("boot", |store| store.set_state(&["ready"], json!(true))))
///     .build()
///     .unwrap();
/// assert_eq!(store.state_at(&["ready"]), Some(json!(true)));
/// ```
pub fn plugin_fn<F>(name: impl Into<String>, f: F) -> FnPlugin<F>
where
    F: Fn(&Store) -> Result<()>,
{
    FnPlugin {
        name: name.into(),
        f,
    }
}
