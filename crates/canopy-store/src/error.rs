//! Error types for store construction, registration, and dispatch.

use canopy_reactive::TreeError;
use thiserror::Error;

/// Errors that can occur while building or using a [`Store`](crate::Store).
///
/// Tree-building and installation errors are structural: they mean the module
/// tree is misconfigured and are returned immediately. Lookup errors name the
/// missing mutation, action, or getter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A root module was registered while one already exists.
    #[error("a root module is already registered")]
    DuplicateRoot,

    /// A nested module was registered under a parent that does not exist.
    #[error("cannot register module {path}: parent module {parent} does not exist")]
    UnknownParent { path: String, parent: String },

    /// A module path does not name an installed module.
    #[error("module not found: {path}")]
    UnknownModule { path: String },

    /// A module name cannot be used as a path segment.
    #[error("invalid module name {name:?}: {reason}")]
    InvalidModuleName { name: String, reason: String },

    /// `commit` was called with a name no module registered.
    #[error("unknown mutation type: {name}")]
    UnknownMutation { name: String },

    /// `dispatch` was called with a name no module registered.
    #[error("unknown action type: {name}")]
    UnknownAction { name: String },

    /// A getter was read that no module declared.
    #[error("unknown getter: {name}")]
    UnknownGetter { name: String },

    /// Two modules declared a getter under the same qualified name.
    #[error("getter already defined: {name}")]
    DuplicateGetter { name: String },

    /// The reactive state tree rejected a read or write.
    #[error("state tree error: {0}")]
    Tree(#[from] TreeError),

    /// A plugin failed while being applied to the store.
    #[error("plugin '{name}' failed: {message}")]
    Plugin { name: String, message: String },

    /// An action body reported a failure.
    #[error("action failed: {0}")]
    Action(String),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Create a plugin error with a name and message.
    pub fn plugin(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an action failure.
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }
}

/// Convenience type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
