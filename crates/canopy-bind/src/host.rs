//! A minimal component host with before-create hooks.
//!
//! Components form a tree through their `parent` link. Every hook registered
//! on the host runs once per component, in registration order, while the
//! component is being mounted and before it is visible in the host. Hooks see
//! the already-mounted parent, which is how the store-injection hook lets a
//! whole subtree share the store given to its root.

use std::fmt;

use canopy_store::Store;
use tracing::debug;

use crate::error::{BindError, Result};
use crate::helpers::StoreScope;

/// Index of a component in its [`ComponentHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Options a component is created with.
#[derive(Clone, Debug, Default)]
pub struct ComponentOptions {
    pub name: String,
    /// A store given explicitly to this component. Usually only the root of
    /// a tree carries one.
    pub store: Option<Store>,
}

impl ComponentOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: None,
        }
    }

    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }
}

/// A mounted component instance.
#[derive(Debug)]
pub struct Component {
    id: ComponentId,
    parent: Option<ComponentId>,
    options: ComponentOptions,
    store: Option<Store>,
}

impl Component {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn options(&self) -> &ComponentOptions {
        &self.options
    }

    /// Set the store this component resolves to.
    pub fn set_store(&mut self, store: Option<Store>) {
        self.store = store;
    }
}

impl StoreScope for Component {
    fn scope_name(&self) -> &str {
        self.name()
    }

    fn store(&self) -> Option<&Store> {
        self.store.as_ref()
    }
}

/// Runs while a component is created. The second argument is its parent.
pub type BeforeCreateHook = Box<dyn Fn(&mut Component, Option<&Component>)>;

/// Resolve a component's store: its own `store` option if given, otherwise
/// whatever its parent resolved.
pub fn inject_store(component: &mut Component, parent: Option<&Component>) {
    let store = component
        .options
        .store
        .clone()
        .or_else(|| parent.and_then(|p| p.store.clone()));
    component.set_store(store);
}

/// Owns a tree of components and the hooks applied to each of them.
#[derive(Default)]
pub struct ComponentHost {
    components: Vec<Component>,
    hooks: Vec<BeforeCreateHook>,
}

impl ComponentHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host with [`inject_store`] installed.
    pub fn with_store_injection() -> Self {
        let mut host = Self::new();
        host.use_hook(inject_store);
        host
    }

    /// Register a before-create hook for every component mounted from now on.
    pub fn use_hook(
        &mut self,
        hook: impl Fn(&mut Component, Option<&Component>) + 'static,
    ) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Create a component under `parent` (or as a root) and run every hook on
    /// it.
    pub fn mount(
        &mut self,
        parent: Option<ComponentId>,
        options: ComponentOptions,
    ) -> Result<ComponentId> {
        let parent_component = parent.map(|id| self.get(id)).transpose()?;

        let id = ComponentId(self.components.len());
        let mut component = Component {
            id,
            parent,
            options,
            store: None,
        };
        for hook in &self.hooks {
            hook(&mut component, parent_component);
        }

        debug!(
            component = %component.name(),
            %id,
            has_store = component.store.is_some(),
            "component mounted"
        );
        self.components.push(component);
        Ok(id)
    }

    /// Borrow a mounted component.
    pub fn get(&self, id: ComponentId) -> Result<&Component> {
        self.components
            .get(id.0)
            .ok_or(BindError::UnknownComponent { id })
    }

    /// Direct children of `id`, in mount order.
    pub fn children(&self, id: ComponentId) -> Vec<ComponentId> {
        self.components
            .iter()
            .filter(|c| c.parent == Some(id))
            .map(Component::id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for ComponentHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHost")
            .field("components", &self.components.len())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use canopy_store::ModuleDefinition;
    use serde_json::json;

    use super::*;

    fn store(name: &str) -> Store {
        Store::new(ModuleDefinition::new(json!({ "name": name }))).unwrap()
    }

    fn store_name(component: &Component) -> Option<serde_json::Value> {
        component.store().and_then(|s| s.state_at(&["name"]))
    }

    #[test]
    fn subtree_inherits_root_store() {
        let mut host = ComponentHost::with_store_injection();
        let app = host
            .mount(None, ComponentOptions::new("app").with_store(store("root")))
            .unwrap();
        let page = host.mount(Some(app), ComponentOptions::new("page")).unwrap();
        let button = host.mount(Some(page), ComponentOptions::new("button")).unwrap();

        let button = host.get(button).unwrap();
        assert_eq!(store_name(button), Some(json!("root")));
        assert_eq!(button.parent(), Some(page));
    }

    #[test]
    fn explicit_store_wins_over_parent() {
        let mut host = ComponentHost::with_store_injection();
        let app = host
            .mount(None, ComponentOptions::new("app").with_store(store("outer")))
            .unwrap();
        let widget = host
            .mount(Some(app), ComponentOptions::new("widget").with_store(store("inner")))
            .unwrap();
        let leaf = host.mount(Some(widget), ComponentOptions::new("leaf")).unwrap();

        assert_eq!(store_name(host.get(widget).unwrap()), Some(json!("inner")));
        assert_eq!(store_name(host.get(leaf).unwrap()), Some(json!("inner")));
    }

    #[test]
    fn root_without_store_resolves_none() {
        let mut host = ComponentHost::with_store_injection();
        let app = host.mount(None, ComponentOptions::new("app")).unwrap();
        let child = host.mount(Some(app), ComponentOptions::new("child")).unwrap();
        assert!(host.get(child).unwrap().store().is_none());
    }

    #[test]
    fn without_injection_nothing_is_resolved() {
        let mut host = ComponentHost::new();
        let app = host
            .mount(None, ComponentOptions::new("app").with_store(store("root")))
            .unwrap();
        assert!(host.get(app).unwrap().store().is_none());
    }

    #[test]
    fn hooks_run_in_order_once_per_component() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let second = Rc::clone(&log);

        let mut host = ComponentHost::new();
        host.use_hook(move |c, _| first.borrow_mut().push(format!("1:{}", c.name())))
            .use_hook(move |c, _| second.borrow_mut().push(format!("2:{}", c.name())));

        let app = host.mount(None, ComponentOptions::new("app")).unwrap();
        host.mount(Some(app), ComponentOptions::new("page")).unwrap();

        assert_eq!(*log.borrow(), vec!["1:app", "2:app", "1:page", "2:page"]);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut host = ComponentHost::with_store_injection();
        let err = host
            .mount(Some(ComponentId(7)), ComponentOptions::new("orphan"))
            .unwrap_err();
        assert!(matches!(err, BindError::UnknownComponent { .. }));
        assert!(host.is_empty());
    }

    #[test]
    fn children_in_mount_order() {
        let mut host = ComponentHost::new();
        let app = host.mount(None, ComponentOptions::new("app")).unwrap();
        let a = host.mount(Some(app), ComponentOptions::new("a")).unwrap();
        let b = host.mount(Some(app), ComponentOptions::new("b")).unwrap();
        host.mount(Some(a), ComponentOptions::new("a1")).unwrap();
        assert_eq!(host.children(app), vec![a, b]);
        assert_eq!(host.len(), 4);
    }
}
