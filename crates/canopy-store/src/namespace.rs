//! Namespace resolution.
//!
//! A module's namespace is the concatenation of `name/` for every module on
//! its path that is flagged namespaced. Modules without the flag are
//! transparent: their getters, mutations, and actions share the namespace of
//! their nearest namespaced ancestor (or the flat root namespace), so names
//! can collide across such modules. Collisions are not an error.

use crate::collection::ModuleCollection;
use crate::error::{Result, StoreError};
use crate::path::ModulePath;

/// Resolve the namespace prefix for the module at `path`.
///
/// Walks the installed tree from the root, so it reflects every registration
/// made so far, including dynamic ones. Fails with
/// [`StoreError::UnknownModule`] if any segment is missing.
pub fn resolve_namespace(modules: &ModuleCollection, path: &ModulePath) -> Result<String> {
    let unknown = || StoreError::UnknownModule {
        path: path.to_string(),
    };

    let mut current = modules.root().ok_or_else(unknown)?;
    let mut namespace = String::new();
    for segment in path.segments() {
        current = modules.record(current).child(segment).ok_or_else(unknown)?;
        if modules.record(current).is_namespaced() {
            namespace.push_str(segment);
            namespace.push('/');
        }
    }
    Ok(namespace)
}

/// Join a namespace prefix and a local name into a qualified key.
pub fn qualify(namespace: &str, name: &str) -> String {
    format!("{namespace}{name}")
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::definition::ModuleDefinition;

    /// Build a chain root -> seg1 -> seg2 -> ... with the given flags.
    fn chain(levels: &[(String, bool)]) -> ModuleCollection {
        let mut def: Option<ModuleDefinition> = None;
        let mut child_name: Option<String> = None;
        for (name, namespaced) in levels.iter().rev() {
            let mut module = ModuleDefinition::new(json!({})).namespaced(*namespaced);
            if let (Some(child), Some(child_name)) = (def.take(), child_name.take()) {
                module = module.module(child_name, child);
            }
            def = Some(module);
            child_name = Some(name.clone());
        }

        let mut root = ModuleDefinition::default();
        if let (Some(child), Some(child_name)) = (def, child_name) {
            root = root.module(child_name, child);
        }
        ModuleCollection::from_root(Rc::new(root)).unwrap()
    }

    fn path_of(levels: &[(String, bool)]) -> ModulePath {
        ModulePath::new(levels.iter().map(|(name, _)| name.clone()))
    }

    #[test]
    fn root_namespace_is_empty() {
        let modules = chain(&[]);
        assert_eq!(resolve_namespace(&modules, &ModulePath::root()).unwrap(), "");
    }

    #[test]
    fn unnamespaced_middle_segment_contributes_nothing() {
        let levels = vec![
            ("seg1".to_string(), true),
            ("seg2".to_string(), false),
            ("seg3".to_string(), true),
        ];
        let modules = chain(&levels);
        let namespace = resolve_namespace(&modules, &path_of(&levels)).unwrap();
        assert_eq!(namespace, "seg1/seg3/");
    }

    #[test]
    fn fully_unnamespaced_chain_is_flat() {
        let levels = vec![("d".to_string(), false), ("e".to_string(), false)];
        let modules = chain(&levels);
        assert_eq!(resolve_namespace(&modules, &path_of(&levels)).unwrap(), "");
    }

    #[test]
    fn unknown_segment_fails() {
        let modules = chain(&[("a".to_string(), true)]);
        let err = resolve_namespace(&modules, &ModulePath::from(["a", "zz"])).unwrap_err();
        assert!(matches!(err, StoreError::UnknownModule { .. }));
    }

    #[test]
    fn empty_collection_fails() {
        let err = resolve_namespace(&ModuleCollection::new(), &ModulePath::root()).unwrap_err();
        assert!(matches!(err, StoreError::UnknownModule { .. }));
    }

    #[test]
    fn qualify_joins() {
        assert_eq!(qualify("b/c/", "addNum"), "b/c/addNum");
        assert_eq!(qualify("", "addNum"), "addNum");
    }

    proptest! {
        #[test]
        fn namespace_is_concatenation_of_flagged_segments(
            levels in prop::collection::vec(("[a-z]{1,6}", any::<bool>()), 0..6)
        ) {
            let modules = chain(&levels);
            let expected: String = levels
                .iter()
                .filter(|(_, namespaced)| *namespaced)
                .map(|(name, _)| format!("{name}/"))
                .collect();
            prop_assert_eq!(resolve_namespace(&modules, &path_of(&levels)).unwrap(), expected);
        }
    }
}
