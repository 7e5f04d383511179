use crate::object::Object;
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};

/// Shared handle to a scope.
/// Closures keep the scope they were created in alive.
pub type Env = Rc<RefCell<Environment>>;

/// Name bindings of a single scope.
#[derive(Debug, Default)]
pub struct Environment {
    store: FxHashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    /// Create a new global scope.
    pub fn new() -> Env {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Create a new scope whose lookups fall back to `outer`.
    pub fn enclosed(outer: Env) -> Env {
        Rc::new(RefCell::new(Self {
            store: FxHashMap::default(),
            outer: Some(outer),
        }))
    }

    /// Look up `name` in this scope, then in each enclosing scope.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Bind `name` in this scope only.
    /// Shadows any binding of an enclosing scope.
    pub fn set(&mut self, name: impl Into<String>, value: Object) -> Object {
        self.store.insert(name.into(), value.clone());
        value
    }
}
