//! Shared, mutable property maps.
//!
//! Props are reference-counted: the parent that built a child's props and
//! the child instance reading them see the same map. That shared mutability
//! is what makes the binding helpers work — writing through a child's input
//! binding is visible to the parent's next render.

use alloc::{collections::BTreeMap, rc::Rc, string::String, vec::Vec};
use core::cell::RefCell;

use serde_json::Value;

use crate::event::Handler;

/// A single prop: either a data value or an event handler.
#[derive(Debug, Clone)]
pub enum PropValue {
    /// Plain data. Primitive values become attributes when materialized;
    /// objects and arrays are carried but never serialized into the tree.
    Value(Value),
    /// An event callback, wired as a listener when the key carries the
    /// event prefix.
    Handler(Handler),
}

impl PropValue {
    /// Returns the data value, if this prop holds one.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Handler(_) => None,
        }
    }

    /// Returns the handler, if this prop holds one.
    #[must_use]
    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Self::Handler(handler) => Some(handler),
            Self::Value(_) => None,
        }
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Handler> for PropValue {
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

/// The property map handed to a component instance.
///
/// Cheap to clone; clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct Props(Rc<RefCell<BTreeMap<String, PropValue>>>);

impl Props {
    /// Creates an empty props map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a prop.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.0.borrow_mut().insert(key.into(), value.into());
    }

    /// Removes a prop, returning it when present.
    pub fn remove(&self, key: &str) -> Option<PropValue> {
        self.0.borrow_mut().remove(key)
    }

    /// Returns the prop stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<PropValue> {
        self.0.borrow().get(key).cloned()
    }

    /// Returns the data value stored under `key`, ignoring handlers.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key)?.as_value().cloned()
    }

    /// Returns the handler stored under `key`, ignoring data values.
    #[must_use]
    pub fn handler(&self, key: &str) -> Option<Handler> {
        self.0.borrow().get(key)?.as_handler().cloned()
    }

    /// Snapshots every entry, in key order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, PropValue)> {
        self.0
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Returns the number of props.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` when the map holds no props.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl FromIterator<(String, PropValue)> for Props {
    fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
        let props = Self::new();
        for (key, value) in iter {
            props.insert(key, value);
        }
        props
    }
}
