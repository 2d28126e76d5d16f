//! Key-path resolution over JSON objects.
//!
//! A state path is an ordered list of object keys from the root. Only object
//! members are traversed; arrays and scalars end a path.

use serde_json::Value;

/// Resolve `path` against `root`, returning the value it names.
pub fn resolve<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |node, key| node.as_object()?.get(key))
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(root, |node, key| node.as_object_mut()?.get_mut(key))
}

/// Render a path for messages: `a.b.c`, or `<root>` for the empty path.
pub fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
