//! Error types for component hosting and store bindings.

use canopy_store::StoreError;
use thiserror::Error;

use crate::host::ComponentId;

/// Errors raised while mounting components or calling bindings.
#[derive(Debug, Error)]
pub enum BindError {
    /// A binding was used on a component that resolved no store.
    #[error("component '{component}' has no store")]
    NoStore { component: String },

    /// A component id does not belong to this host.
    #[error("component not found: {id}")]
    UnknownComponent { id: ComponentId },

    /// The bound store rejected the call.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
