//! The capability set handed to component instances.
//!
//! A component definition receives exactly one [`Context`]. Its fields are
//! the only sanctioned capabilities: the re-render trigger, the reactive
//! wrapper factory, the shared store, and the injection registry.

use alloc::rc::Rc;
use core::{cell::RefCell, fmt};

use serde_json::Value;

use crate::{reactive::Observed, registry::Registry, store::Store};

/// The deferred re-render trigger of one component instance.
///
/// The materializer connects the trigger to the instance's render closure
/// only after the first render has completed; a request arriving earlier is
/// a reported contract violation and is ignored — the first render still
/// completes normally.
#[derive(Clone, Default)]
pub struct Updater {
    render: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Updater {
    /// Creates a trigger that is not yet connected to a render closure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a re-render of the owning instance.
    pub fn request(&self) {
        let render = self.render.borrow().clone();
        match render {
            Some(render) => render(),
            None => tracing::error!(
                "re-render requested before the initial render completed; ignoring"
            ),
        }
    }

    /// Connects the trigger to the instance's render closure. Called by the
    /// materializer once the first render has been committed.
    pub fn connect(&self, render: Rc<dyn Fn()>) {
        *self.render.borrow_mut() = Some(render);
    }

    /// Returns `true` once the trigger is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.render.borrow().is_some()
    }
}

/// Capabilities available to a component instance.
#[derive(Debug, Clone)]
pub struct Context {
    store: Store,
    registry: Registry,
    updater: Updater,
}

impl Context {
    /// Assembles a context. Backends call this once per instance.
    #[must_use]
    pub fn new(store: Store, registry: Registry, updater: Updater) -> Self {
        Self {
            store,
            registry,
            updater,
        }
    }

    /// The shared data store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The injection registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The instance's re-render trigger.
    #[must_use]
    pub fn updater(&self) -> &Updater {
        &self.updater
    }

    /// Requests a re-render of this instance.
    pub fn request_render(&self) {
        self.updater.request();
    }

    /// Wraps a value so that mutations re-render this instance.
    ///
    /// The value must be an object or an array; primitives are reported.
    #[must_use]
    pub fn observe(&self, value: Value) -> Observed {
        let updater = self.updater.clone();
        Observed::new(value, move || updater.request())
    }
}
