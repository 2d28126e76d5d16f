//! Module paths and module name validation.
//!
//! A [`ModulePath`] is the chain of child names from the root module to a
//! target module; the root itself has the empty path. The same chain locates
//! the module's slice in the state tree.
//!
//! Valid module names:
//! - Must be non-empty
//! - Must not contain `/` (the namespace separator)
//! - Must not contain whitespace or control characters

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Path of a module from the root, one segment per nesting level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// The root module's path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments.
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Nesting depth (0 for the root).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments, outermost first. Doubles as the state-tree path.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The module's own name, or `None` for the root.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<ModulePath> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// The path of the child `name` under this path.
    pub fn child(&self, name: &str) -> ModulePath {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("/"))
        }
    }
}

/// A single name is a one-segment path.
impl From<&str> for ModulePath {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for ModulePath {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for ModulePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<Vec<&str>> for ModulePath {
    fn from(segments: Vec<&str>) -> Self {
        Self::new(segments)
    }
}

impl From<&[&str]> for ModulePath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for ModulePath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

/// Validate a module name, returning `Ok(())` if it can be used as a path
/// segment.
///
/// # Examples
///
/// ```
/// use canopy_store::path::validate_module_name;
///
/// assert!(validate_module_name("cart").is_ok());
/// assert!(validate_module_name("").is_err());
/// assert!(validate_module_name("a/b").is_err());
/// ```
pub fn validate_module_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("module name must not be empty".to_string())
    } else if name.contains('/') {
        Some("must not contain '/'".to_string())
    } else {
        name.chars()
            .find(|ch| ch.is_whitespace() || ch.is_control())
            .map(|ch| format!("contains forbidden character: {ch:?}"))
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidModuleName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
