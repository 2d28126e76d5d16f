//! Binding helpers.
//!
//! Each helper turns a list of names into a [`BindingMap`] from
//! component-local names to store-bound accessors or methods. A binding holds
//! only the store key; the store is resolved from the [`StoreScope`] it is
//! called with, so one map can be shared by every instance of a component.

use canopy_store::Store;
use serde_json::Value;

use crate::error::{BindError, Result};

/// Anything that may resolve a store: a mounted component, or the store
/// itself.
pub trait StoreScope {
    /// Name used in [`BindError::NoStore`].
    fn scope_name(&self) -> &str;

    fn store(&self) -> Option<&Store>;

    /// The resolved store, or [`BindError::NoStore`].
    fn require_store(&self) -> Result<&Store> {
        self.store().ok_or_else(|| BindError::NoStore {
            component: self.scope_name().to_string(),
        })
    }
}

impl StoreScope for Store {
    fn scope_name(&self) -> &str {
        "<store>"
    }

    fn store(&self) -> Option<&Store> {
        Some(self)
    }
}

/// The names a helper binds: either a plain list, where each local name is
/// also the store key, or a list of `(local, store_key)` renames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Names {
    List(Vec<String>),
    Renamed(Vec<(String, String)>),
}

impl Names {
    /// `(local, store_key)` pairs in input order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        match self {
            Self::List(names) => names.iter().map(|n| (n.clone(), n.clone())).collect(),
            Self::Renamed(pairs) => pairs.clone(),
        }
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Self::List(names)
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Self::List(names.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Self::List(names.into_iter().map(String::from).collect())
    }
}

impl From<Vec<(&str, &str)>> for Names {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        Self::Renamed(
            pairs
                .into_iter()
                .map(|(local, key)| (local.to_string(), key.to_string()))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Names {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::from(Vec::from(pairs))
    }
}

/// Bindings keyed by local name, in input order. A repeated local name keeps
/// its first position and the last binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> BindingMap<T> {
    fn build(names: Names, bind: impl Fn(String) -> T) -> Self {
        let mut entries: Vec<(String, T)> = Vec::new();
        for (local, key) in names.pairs() {
            let binding = bind(key);
            match entries.iter_mut().find(|(existing, _)| *existing == local) {
                Some(entry) => entry.1 = binding,
                None => entries.push((local, binding)),
            }
        }
        Self { entries }
    }

    pub fn get(&self, local: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(name, _)| name == local)
            .map(|(_, binding)| binding)
    }

    pub fn contains(&self, local: &str) -> bool {
        self.get(local).is_some()
    }

    /// Local names in input order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads a top-level state key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBinding {
    key: String,
}

impl StateBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The current value, or `Null` when the key is absent.
    pub fn get<S: StoreScope + ?Sized>(&self, scope: &S) -> Result<Value> {
        let store = scope.require_store()?;
        Ok(store.state_at(&[self.key.as_str()]).unwrap_or(Value::Null))
    }
}

/// Reads a getter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetterBinding {
    key: String,
}

impl GetterBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get<S: StoreScope + ?Sized>(&self, scope: &S) -> Result<Value> {
        Ok(scope.require_store()?.getter(&self.key)?)
    }
}

/// Commits a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationBinding {
    key: String,
}

impl MutationBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn call<S: StoreScope + ?Sized>(&self, scope: &S, payload: Value) -> Result<()> {
        Ok(scope.require_store()?.commit(&self.key, payload)?)
    }
}

/// Dispatches an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionBinding {
    key: String,
}

impl ActionBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn call<S: StoreScope + ?Sized>(&self, scope: &S, payload: Value) -> Result<()> {
        Ok(scope.require_store()?.dispatch(&self.key, payload)?)
    }
}

/// Bind top-level state keys as accessors.
pub fn map_state(names: impl Into<Names>) -> BindingMap<StateBinding> {
    BindingMap::build(names.into(), |key| StateBinding { key })
}

/// Bind getters as accessors.
pub fn map_getters(names: impl Into<Names>) -> BindingMap<GetterBinding> {
    BindingMap::build(names.into(), |key| GetterBinding { key })
}

/// Bind mutations as methods that commit their payload.
pub fn map_mutations(names: impl Into<Names>) -> BindingMap<MutationBinding> {
    BindingMap::build(names.into(), |key| MutationBinding { key })
}

/// Bind actions as methods that dispatch their payload.
pub fn map_actions(names: impl Into<Names>) -> BindingMap<ActionBinding> {
    BindingMap::build(names.into(), |key| ActionBinding { key })
}

#[cfg(test)]
mod tests {
    use canopy_store::{ModuleDefinition, StoreError};
    use serde_json::json;

    use super::*;

    fn store() -> Store {
        Store::new(
            ModuleDefinition::new(json!({"name": "yyh123", "num": 22, "title": "learning"}))
                .getter("title", |s| {
                    json!(format!("yyh123 {}", s["title"].as_str().unwrap_or("")))
                })
                .mutation("addNum", |s, p| {
                    let next = s["num"].as_i64().unwrap_or(0) + p.as_i64().unwrap_or(0);
                    s["num"] = json!(next);
                })
                .mutation("changeName", |s, p| s["name"] = p.clone())
                .action("changeName", |store, p| store.commit("changeName", p.clone()))
                .module(
                    "b",
                    ModuleDefinition::new(json!({"age": "b100"}))
                        .namespaced(true)
                        .mutation("addNum", |s, _| s["age"] = json!("b101")),
                ),
        )
        .unwrap()
    }

    struct Bare;

    impl StoreScope for Bare {
        fn scope_name(&self) -> &str {
            "bare"
        }

        fn store(&self) -> Option<&Store> {
            None
        }
    }

    #[test]
    fn names_from_list_and_renames() {
        assert_eq!(
            Names::from(["num", "name"]).pairs(),
            vec![("num".to_string(), "num".to_string()), ("name".to_string(), "name".to_string())]
        );
        assert_eq!(
            Names::from([("addB", "b/addNum")]).pairs(),
            vec![("addB".to_string(), "b/addNum".to_string())]
        );
    }

    #[test]
    fn map_state_reads_top_level_keys() {
        let store = store();
        let state = map_state(["num", "name", "missing"]);
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["num", "name", "missing"]);

        assert_eq!(state.get("num").unwrap().get(&store).unwrap(), json!(22));
        store.commit("addNum", json!(1)).unwrap();
        assert_eq!(state.get("num").unwrap().get(&store).unwrap(), json!(23));
        assert_eq!(state.get("missing").unwrap().get(&store).unwrap(), Value::Null);
    }

    #[test]
    fn map_getters_recompute() {
        let store = store();
        let getters = map_getters(["title"]);
        assert_eq!(
            getters.get("title").unwrap().get(&store).unwrap(),
            json!("yyh123 learning")
        );
    }

    #[test]
    fn map_mutations_with_renames() {
        let store = store();
        let methods = map_mutations([("addNum", "addNum"), ("addB", "b/addNum")]);
        methods.get("addB").unwrap().call(&store, json!(1)).unwrap();
        assert_eq!(store.state_at(&["b", "age"]), Some(json!("b101")));
        assert_eq!(methods.get("addB").unwrap().key(), "b/addNum");
        assert_eq!(store.state_at(&["num"]), Some(json!(22)));
    }

    #[test]
    fn map_actions_dispatch() {
        let store = store();
        let methods = map_actions(["changeName"]);
        methods.get("changeName").unwrap().call(&store, json!("bob")).unwrap();
        assert_eq!(store.state_at(&["name"]), Some(json!("bob")));
    }

    #[test]
    fn store_errors_pass_through() {
        let store = store();
        let err = map_mutations(["nope"]).get("nope").unwrap().call(&store, Value::Null).unwrap_err();
        assert!(matches!(err, BindError::Store(StoreError::UnknownMutation { .. })));
        assert_eq!(err.to_string(), "unknown mutation type: nope");
    }

    #[test]
    fn missing_store_is_reported() {
        let err = map_state(["num"]).get("num").unwrap().get(&Bare).unwrap_err();
        assert_eq!(err.to_string(), "component 'bare' has no store");
    }

    #[test]
    fn repeated_local_name_keeps_last_binding() {
        let methods = map_mutations([("go", "a"), ("other", "b"), ("go", "c")]);
        assert_eq!(methods.len(), 2);
        assert_eq!(methods.keys().collect::<Vec<_>>(), vec!["go", "other"]);
        assert_eq!(methods.get("go").unwrap().key(), "c");
    }
}
