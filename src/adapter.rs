//! Store-aware component composition.
//!
//! Stateful, struct-shaped components implement the [`StoreComponent`]
//! capability pair — `update` to absorb store changes, `view` to describe
//! themselves — and get wrapped by [`WithStore`], an adapter that holds the
//! component, subscribes its `update` to the store, and forwards `set`/
//! `get` passthroughs. Composition, not subclassing: the adapter works for
//! any implementor without knowing its type.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ripple_core::{Store, StoreData, Subscription, VNode, Value};

/// The capability set of a store-aware component.
pub trait StoreComponent: 'static {
    /// Absorbs the store state; called once on wrap and on every write.
    fn update(&mut self, data: &StoreData);

    /// Describes the component as a virtual tree.
    fn view(&self) -> VNode;
}

/// Adapter binding a [`StoreComponent`] to a store for its lifetime.
///
/// Dropping the adapter releases the subscription.
pub struct WithStore<C: StoreComponent> {
    component: Rc<RefCell<C>>,
    store: Store,
    _subscription: Subscription,
}

impl<C: StoreComponent> fmt::Debug for WithStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithStore")
            .field("component", &core::any::type_name::<C>())
            .finish()
    }
}

impl<C: StoreComponent> WithStore<C> {
    /// Wraps a component: seeds it with the current store state, then
    /// keeps it updated on every write.
    #[must_use]
    pub fn new(component: C, store: &Store) -> Self {
        let component = Rc::new(RefCell::new(component));
        component.borrow_mut().update(&store.data());

        let subscription = store.watch({
            let component = Rc::clone(&component);
            move |data: &StoreData| component.borrow_mut().update(data)
        });

        Self {
            component,
            store: store.clone(),
            _subscription: subscription,
        }
    }

    /// Writes through to the store (and so back into the component).
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.store.set(key, value);
    }

    /// Reads through to the store.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    /// The wrapped component's current view.
    #[must_use]
    pub fn view(&self) -> VNode {
        self.component.borrow().view()
    }

    /// Runs a closure against the wrapped component.
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.component.borrow())
    }
}
