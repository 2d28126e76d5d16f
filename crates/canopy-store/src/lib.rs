//! Canopy: a hierarchical state container.
//!
//! An application's state lives in a single tree. The tree is composed from
//! nested [`ModuleDefinition`]s, each owning a slice of state plus the
//! getters, mutations, and actions that operate on it. All state changes go
//! through named mutations ([`Store::commit`]), asynchronous or compound logic
//! goes through named actions ([`Store::dispatch`]), and every mutation is
//! announced to subscribers.
//!
//! # Architecture
//!
//! - [`collection`] builds the module tree from the nested definitions and
//!   grows it when modules are registered later.
//! - [`namespace`] computes the `a/b/` prefix that qualifies a module's
//!   operation names.
//! - The installer grafts every module's slice into the reactive tree at its
//!   path and fills the store's dispatch tables.
//! - [`store`] is the facade: commit, dispatch, getters, subscriptions,
//!   `replace_state`, and `register_module`.
//! - [`strict`] watches the whole tree and flags writes made outside a
//!   commit.
//! - [`plugin`] and [`plugins`] extend a store at construction time.
//!
//! State itself is hosted by an [`ObservableTree`](canopy_reactive::ObservableTree)
//! from the `canopy-reactive` crate.

pub mod collection;
pub mod config;
pub mod definition;
pub mod error;
mod installer;
pub mod namespace;
pub mod path;
pub mod plugin;
pub mod plugins;
pub mod store;
pub mod strict;

pub use collection::{ModuleCollection, ModuleId, ModuleRecord, SliceState};
pub use config::{StoreConfig, ViolationPolicy};
pub use definition::{ActionFn, GetterFn, ModuleDefinition, MutationFn};
pub use error::{Result, StoreError};
pub use namespace::{qualify, resolve_namespace};
pub use path::{validate_module_name, ModulePath};
pub use plugin::{plugin_fn, FnPlugin, Plugin};
pub use plugins::LoggerPlugin;
pub use store::{MutationRecord, Store, StoreBuilder, Subscriber, SubscriptionId};
pub use strict::StrictModeViolation;

pub use canopy_reactive::{ObservableTree, ReactiveTree};
