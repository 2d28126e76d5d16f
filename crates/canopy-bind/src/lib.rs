//! Host-framework integration for Canopy stores.
//!
//! - [`host`]: a component tree with before-create hooks, and the
//!   [`inject_store`] hook that lets every component resolve the store given
//!   to its nearest configured ancestor.
//! - [`helpers`]: `map_state`, `map_getters`, `map_mutations`, and
//!   `map_actions`, which project store state and operations into
//!   component-local names.

pub mod error;
pub mod helpers;
pub mod host;

pub use error::{BindError, Result};
pub use helpers::{
    map_actions, map_getters, map_mutations, map_state, ActionBinding, BindingMap,
    GetterBinding, MutationBinding, Names, StateBinding, StoreScope,
};
pub use host::{
    inject_store, BeforeCreateHook, Component, ComponentHost, ComponentId, ComponentOptions,
};
