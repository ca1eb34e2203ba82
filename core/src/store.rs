//! The observable key/value store driving shared state.
//!
//! Every write goes through a single mutation path and triggers exactly one
//! synchronous notification pass before the mutating call returns. The
//! subscriber list is snapshotted before a pass, so subscribing or
//! unsubscribing from within a callback never corrupts the pass in flight —
//! such changes simply take effect from the next write. Note that a
//! subscriber writing to the store starts a nested pass of its own; the
//! data borrow is released before notification, so this is safe, if rarely
//! wise.

use alloc::{rc::Rc, string::String, vec::Vec};
use core::{cell::RefCell, fmt};

use serde_json::{Map, Value};

/// The full key/value state a subscriber observes.
pub type StoreData = Map<String, Value>;

/// A store subscriber. Identity is the `Rc` allocation: the same `Rc`
/// subscribed twice notifies once.
pub type SubscriberFn = Rc<dyn Fn(&StoreData)>;

#[derive(Default)]
struct StoreInner {
    data: RefCell<StoreData>,
    subscribers: RefCell<Vec<SubscriberFn>>,
}

/// An observable key/value container.
///
/// Cheap to clone; clones share the same data and subscriber set. Stores
/// are explicitly constructed — typically owned by the application root and
/// handed to components through their context — and live as long as any
/// clone does.
#[derive(Clone, Default)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("data", &self.inner.data.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with initial data. No notification fires.
    #[must_use]
    pub fn with_data(data: StoreData) -> Self {
        let store = Self::new();
        *store.inner.data.borrow_mut() = data;
        store
    }

    /// Writes a value and synchronously notifies every subscriber, in
    /// subscription order, before returning.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.data.borrow_mut().insert(key.into(), value.into());
        self.notify();
    }

    /// Reads a value. Unknown keys yield `None`, never an error.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.data.borrow().get(key).cloned()
    }

    /// Snapshots the full state.
    #[must_use]
    pub fn data(&self) -> StoreData {
        self.inner.data.borrow().clone()
    }

    /// Adds a subscriber. Subscribing the same `Rc` twice is a no-op.
    pub fn subscribe(&self, subscriber: &SubscriberFn) {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        if !subscribers.iter().any(|existing| same_subscriber(existing, subscriber)) {
            subscribers.push(Rc::clone(subscriber));
        }
    }

    /// Removes a subscriber. Unknown subscribers are a no-op.
    pub fn unsubscribe(&self, subscriber: &SubscriberFn) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|existing| !same_subscriber(existing, subscriber));
    }

    /// Subscribes a closure and returns a guard that unsubscribes it when
    /// dropped. This is how the materializer ties a component's store
    /// subscription to the lifetime of its document subtree.
    #[must_use]
    pub fn watch(&self, subscriber: impl Fn(&StoreData) + 'static) -> Subscription {
        let subscriber: SubscriberFn = Rc::new(subscriber);
        self.subscribe(&subscriber);
        Subscription {
            store: self.clone(),
            subscriber,
        }
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn notify(&self) {
        // Snapshot both sides so callbacks may touch the store freely.
        let subscribers: Vec<SubscriberFn> = self.inner.subscribers.borrow().clone();
        let data = self.inner.data.borrow().clone();
        for subscriber in &subscribers {
            subscriber(&data);
        }
    }
}

fn same_subscriber(a: &SubscriberFn, b: &SubscriberFn) -> bool {
    core::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

/// A live store subscription; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Store,
    subscriber: SubscriberFn,
}

impl_debug!(Subscription);

impl Drop for Subscription {
    fn drop(&mut self) {
        self.store.unsubscribe(&self.subscriber);
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use serde_json::{Value, json};

    use super::{Store, SubscriberFn};

    #[test]
    fn one_pass_per_write_observing_post_write_state() {
        let store = Store::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let subscriber: SubscriberFn = Rc::new({
            let seen = Rc::clone(&seen);
            move |data: &super::StoreData| seen.borrow_mut().push(data.get("count").cloned())
        });
        store.subscribe(&subscriber);

        store.set("count", 1);
        store.set("count", 2);
        store.set("other", "x");

        assert_eq!(
            &*seen.borrow(),
            &[Some(json!(1)), Some(json!(2)), Some(json!(2))]
        );
    }

    #[test]
    fn notification_happens_before_set_returns() {
        let store = Store::new();
        let observed = Rc::new(Cell::new(false));

        let subscriber: SubscriberFn = Rc::new({
            let observed = Rc::clone(&observed);
            move |_: &super::StoreData| observed.set(true)
        });
        store.subscribe(&subscriber);

        store.set("flag", true);
        assert!(observed.get());
    }

    #[test]
    fn double_subscribe_of_same_identity_notifies_once() {
        let store = Store::new();
        let calls = Rc::new(Cell::new(0));

        let subscriber: SubscriberFn = Rc::new({
            let calls = Rc::clone(&calls);
            move |_: &super::StoreData| calls.set(calls.get() + 1)
        });
        store.subscribe(&subscriber);
        store.subscribe(&subscriber);

        store.set("k", 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = Store::new();
        let calls = Rc::new(Cell::new(0));

        let subscriber: SubscriberFn = Rc::new({
            let calls = Rc::clone(&calls);
            move |_: &super::StoreData| calls.set(calls.get() + 1)
        });
        store.subscribe(&subscriber);
        store.set("k", 1);
        store.unsubscribe(&subscriber);
        store.set("k", 2);

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn watch_guard_unsubscribes_on_drop() {
        let store = Store::new();
        let calls = Rc::new(Cell::new(0));

        let guard = store.watch({
            let calls = Rc::clone(&calls);
            move |_| calls.set(calls.get() + 1)
        });
        store.set("k", 1);
        assert_eq!(store.subscriber_count(), 1);

        drop(guard);
        store.set("k", 2);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn unknown_key_reads_none() {
        let store = Store::new();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn reentrant_write_from_a_subscriber_runs_its_own_pass() {
        let store = Store::new();
        let passes = Rc::new(Cell::new(0));

        let subscriber: SubscriberFn = Rc::new({
            let passes = Rc::clone(&passes);
            let store = store.clone();
            move |data: &super::StoreData| {
                passes.set(passes.get() + 1);
                if data.get("done").is_none() {
                    store.set("done", true);
                }
            }
        });
        store.subscribe(&subscriber);

        store.set("start", 1);
        // The outer write and the nested write each ran one pass.
        assert_eq!(passes.get(), 2);
        assert_eq!(store.get("done"), Some(Value::Bool(true)));
    }

    #[test]
    fn unsubscribing_during_a_pass_takes_effect_next_pass() {
        let store = Store::new();
        let calls = Rc::new(Cell::new(0));

        let subscriber: Rc<RefCell<Option<SubscriberFn>>> = Rc::new(RefCell::new(None));
        let inner: SubscriberFn = Rc::new({
            let calls = Rc::clone(&calls);
            let store = store.clone();
            let slot = Rc::clone(&subscriber);
            move |_: &super::StoreData| {
                calls.set(calls.get() + 1);
                if let Some(me) = slot.borrow().as_ref() {
                    store.unsubscribe(me);
                }
            }
        });
        *subscriber.borrow_mut() = Some(Rc::clone(&inner));
        store.subscribe(&inner);

        store.set("k", 1);
        store.set("k", 2);
        assert_eq!(calls.get(), 1);
    }
}
