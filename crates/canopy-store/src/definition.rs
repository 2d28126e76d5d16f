//! User-authored module definitions.
//!
//! A [`ModuleDefinition`] is the immutable input to the engine: a state slice,
//! named getters, mutations, and actions, and nested child definitions. Every
//! map keeps insertion order, because install order decides the order in
//! which colliding handlers run.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::store::Store;

/// Derives a value from a module's local state.
pub type GetterFn = Rc<dyn Fn(&Value) -> Value>;

/// Changes a module's local state given a payload.
pub type MutationFn = Rc<dyn Fn(&mut Value, &Value)>;

/// Runs against the whole store given a payload. May commit, dispatch, or
/// schedule asynchronous work.
pub type ActionFn = Rc<dyn Fn(&Store, &Value) -> Result<()>>;

/// A module: a state slice plus operations on it, and child modules.
///
/// ```
/// use canopy_store::ModuleDefinition;
/// use serde_json::json;
///
/// let counter = ModuleDefinition::new(json!({"num": 0}))
///     .namespaced(true)
///     .getter("doubled", |state| json!(state["num"].as_i64().unwrap_or(0) * 2))
///     .mutation("add", |state, payload| {
///         let next = state["num"].as_i64().unwrap_or(0) + payload.as_i64().unwrap_or(0);
///         state["num"] = json!(next);
///     });
/// assert!(counter.is_namespaced());
/// ```
#[derive(Clone)]
pub struct ModuleDefinition {
    namespaced: bool,
    state: Value,
    getters: Vec<(String, GetterFn)>,
    mutations: Vec<(String, MutationFn)>,
    actions: Vec<(String, ActionFn)>,
    modules: Vec<(String, Rc<ModuleDefinition>)>,
}

impl ModuleDefinition {
    /// Create a definition owning `state`.
    pub fn new(state: Value) -> Self {
        Self {
            namespaced: false,
            state,
            getters: Vec::new(),
            mutations: Vec::new(),
            actions: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Set whether this module's name qualifies its (and its descendants')
    /// getters, mutations, and actions.
    pub fn namespaced(mut self, namespaced: bool) -> Self {
        self.namespaced = namespaced;
        self
    }

    /// Declare a getter.
    pub fn getter(mut self, name: impl Into<String>, f: impl Fn(&Value) -> Value + 'static) -> Self {
        let f: GetterFn = Rc::new(f);
        upsert(&mut self.getters, name.into(), f);
        self
    }

    /// Declare a mutation.
    pub fn mutation(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut Value, &Value) + 'static,
    ) -> Self {
        let f: MutationFn = Rc::new(f);
        upsert(&mut self.mutations, name.into(), f);
        self
    }

    /// Declare an action.
    pub fn action(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Store, &Value) -> Result<()> + 'static,
    ) -> Self {
        let f: ActionFn = Rc::new(f);
        upsert(&mut self.actions, name.into(), f);
        self
    }

    /// Nest a child module under `name`.
    pub fn module(mut self, name: impl Into<String>, child: ModuleDefinition) -> Self {
        upsert(&mut self.modules, name.into(), Rc::new(child));
        self
    }

    pub fn is_namespaced(&self) -> bool {
        self.namespaced
    }

    /// The initial state slice.
    pub fn state(&self) -> &Value {
        &self.state
    }

    pub fn getters(&self) -> &[(String, GetterFn)] {
        &self.getters
    }

    pub fn mutations(&self) -> &[(String, MutationFn)] {
        &self.mutations
    }

    pub fn actions(&self) -> &[(String, ActionFn)] {
        &self.actions
    }

    /// Child definitions in declaration order.
    pub fn modules(&self) -> &[(String, Rc<ModuleDefinition>)] {
        &self.modules
    }
}

impl Default for ModuleDefinition {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("namespaced", &self.namespaced)
            .field("state", &self.state)
            .field("getters", &names(&self.getters))
            .field("mutations", &names(&self.mutations))
            .field("actions", &names(&self.actions))
            .field("modules", &self.modules)
            .finish()
    }
}

/// Insert or replace `name`, keeping the first position on replace.
fn upsert<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
    match entries.iter_mut().find(|(existing, _)| *existing == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name, value)),
    }
}

fn names<T>(entries: &[(String, T)]) -> Vec<&str> {
    entries.iter().map(|(name, _)| name.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_is_empty_object_state() {
        let def = ModuleDefinition::default();
        assert_eq!(def.state(), &json!({}));
        assert!(!def.is_namespaced());
    }

    #[test]
    fn declaration_order_is_kept() {
        let def = ModuleDefinition::default()
            .module("b", ModuleDefinition::default())
            .module("a", ModuleDefinition::default())
            .module("c", ModuleDefinition::default());
        assert_eq!(names(def.modules()), vec!["b", "a", "c"]);
    }

    #[test]
    fn redeclaring_replaces_in_place() {
        let def = ModuleDefinition::default()
            .mutation("first", |_, _| {})
            .mutation("second", |_, _| {})
            .mutation("first", |state, _| state["hit"] = json!(true));

        assert_eq!(names(def.mutations()), vec!["first", "second"]);

        let mut state = json!({});
        (def.mutations()[0].1)(&mut state, &Value::Null);
        assert_eq!(state, json!({"hit": true}));
    }

    #[test]
    fn getter_reads_local_state() {
        let def = ModuleDefinition::new(json!({"title": "learning"}))
            .getter("title", |state| json!(format!("yyh123 {}", state["title"].as_str().unwrap_or(""))));
        let value = (def.getters()[0].1)(def.state());
        assert_eq!(value, json!("yyh123 learning"));
    }

    #[test]
    fn debug_lists_names() {
        let def = ModuleDefinition::default().action("load", |_, _| Ok(()));
        let rendered = format!("{def:?}");
        assert!(rendered.contains("load"));
    }
}
