//! Observable state tree for Canopy.
//!
//! This crate is the reactive collaborator the store is built on. It owns a
//! single JSON document and lets callers read, mutate, and graft values at
//! key paths while deep watchers observe every change synchronously.
//!
//! # Architecture
//!
//! - The [`ObservableTree`] trait is the seam the store programs against.
//!   Any host framework with property-level observation can implement it.
//! - [`ReactiveTree`] is the in-memory implementation: a `serde_json::Value`
//!   behind a `RefCell`, diffed before and after every update so watchers see
//!   exactly which leaves changed.
//! - [`attach`](ObservableTree::attach) is the "define a new observed
//!   property" primitive. Keys added after construction through `attach` are
//!   observed exactly like the ones present at construction.
//!
//! # Modules
//!
//! - [`error`]: [`TreeError`] and the crate `Result` alias
//! - [`path`]: key-path resolution helpers
//! - [`diff`]: structural diff between two JSON values
//! - [`traits`]: the [`ObservableTree`] trait and watcher types
//! - [`memory`]: the in-memory [`ReactiveTree`]

pub mod diff;
pub mod error;
pub mod memory;
pub mod path;
pub mod traits;

pub use diff::{diff_at, diff_values, StateChange, StateDiff};
pub use error::{Result, TreeError};
pub use memory::ReactiveTree;
pub use path::{display_path, resolve, resolve_mut};
pub use traits::{ChangeOrigin, ObservableTree, TreeChange, WatchId, Watcher};
