//! A flat, process-wide service registry.
//!
//! The registry is a keyed map from service name to instance — no scoping,
//! no lifecycle hooks. Components reach it through their
//! [`Context`](crate::context::Context) rather than through a global.

use alloc::{collections::BTreeMap, rc::Rc, string::String, vec::Vec};
use core::{any::Any, cell::RefCell, fmt};

/// A name-keyed injection registry.
///
/// Cheap to clone; clones share the same service table.
#[derive(Clone, Default)]
pub struct Registry {
    services: Rc<RefCell<BTreeMap<String, Rc<dyn Any>>>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.services.borrow().keys().cloned().collect();
        f.debug_struct("Registry").field("services", &names).finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service instance under a name, replacing any previous
    /// registration of that name.
    pub fn register<T: 'static>(&self, name: impl Into<String>, service: T) {
        self.services.borrow_mut().insert(name.into(), Rc::new(service));
    }

    /// Registers an already shared service instance.
    pub fn register_shared(&self, name: impl Into<String>, service: Rc<dyn Any>) {
        self.services.borrow_mut().insert(name.into(), service);
    }

    /// Resolves a service by name and type. An unknown name or a type
    /// mismatch yields `None`, never an error.
    #[must_use]
    pub fn resolve<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        let service = self.services.borrow().get(name).cloned()?;
        service.downcast::<T>().ok()
    }

    /// Resolves a service by name without downcasting.
    #[must_use]
    pub fn resolve_any(&self, name: &str) -> Option<Rc<dyn Any>> {
        self.services.borrow().get(name).cloned()
    }

    /// Returns `true` when a service is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.borrow().contains_key(name)
    }
}
