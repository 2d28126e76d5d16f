//! Error types for state tree operations.

use thiserror::Error;

/// Errors that can occur while reading or writing the state tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No value exists at the requested path.
    #[error("state path not found: {path}")]
    PathNotFound { path: String },

    /// A key was attached under a value that is not a JSON object.
    #[error("state at {path} is not an object")]
    NotAnObject { path: String },
}

/// Convenience type alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
