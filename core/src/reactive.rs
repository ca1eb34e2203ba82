//! The reactive object wrapper driving per-instance state.
//!
//! [`Observed`] wraps an object or array value behind explicit accessors:
//! reads see the current state, and every applied mutation invokes the
//! bound callback exactly once, after the write. Components obtain one via
//! [`Context::observe`](crate::context::Context::observe), which binds the
//! callback to the instance's re-render request — local state changes then
//! re-render that instance without going through the shared store.

use alloc::{rc::Rc, string::String, vec::Vec};
use core::{cell::RefCell, fmt};

use serde_json::Value;

/// A value whose mutations invoke a callback.
///
/// Clones share the underlying value and callback, so a wrapper captured by
/// a render closure and one kept by an event handler observe the same
/// state.
#[derive(Clone)]
pub struct Observed {
    value: Rc<RefCell<Value>>,
    on_change: Rc<dyn Fn()>,
}

impl fmt::Debug for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observed")
            .field("value", &self.value.borrow())
            .finish()
    }
}

impl Observed {
    /// Wraps a value.
    ///
    /// The value must be an object or an array; a primitive is reported
    /// through the diagnostic channel before wrapping proceeds in a
    /// degraded state (reads work, keyed writes are rejected).
    pub fn new(value: Value, on_change: impl Fn() + 'static) -> Self {
        if !(value.is_object() || value.is_array()) {
            tracing::error!("observe must be given an object or an array, got a primitive");
        }
        Self {
            value: Rc::new(RefCell::new(value)),
            on_change: Rc::new(on_change),
        }
    }

    /// Reads the entry under `key` of an object value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.value.borrow().get(key).cloned()
    }

    /// Reads the entry at `index` of an array value.
    #[must_use]
    pub fn index(&self, index: usize) -> Option<Value> {
        self.value.borrow().get(index).cloned()
    }

    /// Returns the entry count of the wrapped object or array; 0 for a
    /// (rejected) primitive.
    #[must_use]
    pub fn len(&self) -> usize {
        match &*self.value.borrow() {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    /// Returns `true` when the wrapped value holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clones the current state out of the wrapper.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Writes the entry under `key` of an object value, then fires the
    /// callback. Rejected (reported, no callback) on non-objects.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let applied = match &mut *self.value.borrow_mut() {
            Value::Object(map) => {
                map.insert(key.into(), value.into());
                true
            }
            _ => false,
        };
        self.changed(applied, "set a key on a non-object value");
    }

    /// Writes the entry at `index` of an array value, then fires the
    /// callback. Out-of-bounds writes and non-arrays are rejected.
    pub fn set_index(&self, index: usize, value: impl Into<Value>) {
        let applied = match &mut *self.value.borrow_mut() {
            Value::Array(items) if index < items.len() => {
                items[index] = value.into();
                true
            }
            _ => false,
        };
        self.changed(applied, "set an index outside an array value");
    }

    /// Appends to an array value, then fires the callback.
    pub fn push(&self, value: impl Into<Value>) {
        let applied = match &mut *self.value.borrow_mut() {
            Value::Array(items) => {
                items.push(value.into());
                true
            }
            _ => false,
        };
        self.changed(applied, "push onto a non-array value");
    }

    /// Removes the entry under `key` of an object value, firing the
    /// callback when something was removed.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let removed = match &mut *self.value.borrow_mut() {
            Value::Object(map) => map.remove(key),
            _ => None,
        };
        if removed.is_some() {
            (self.on_change)();
        }
        removed
    }

    /// Empties the wrapped object or array, then fires the callback.
    pub fn clear(&self) {
        let applied = match &mut *self.value.borrow_mut() {
            Value::Object(map) => {
                map.clear();
                true
            }
            Value::Array(items) => {
                items.clear();
                true
            }
            _ => false,
        };
        self.changed(applied, "clear a primitive value");
    }

    /// Reads every array entry, cloned out in order.
    #[must_use]
    pub fn items(&self) -> Vec<Value> {
        match &*self.value.borrow() {
            Value::Array(items) => items.clone(),
            _ => Vec::new(),
        }
    }

    // The borrow is released by the callers before this runs, so the
    // callback may freely read the wrapper again.
    fn changed(&self, applied: bool, rejection: &str) {
        if applied {
            (self.on_change)();
        } else {
            tracing::error!("cannot {rejection}");
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use serde_json::json;

    use super::Observed;

    fn counting(value: serde_json::Value) -> (Observed, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let observed = Observed::new(value, {
            let calls = Rc::clone(&calls);
            move || calls.set(calls.get() + 1)
        });
        (observed, calls)
    }

    #[test]
    fn each_applied_write_fires_once() {
        let (observed, calls) = counting(json!({}));

        observed.set("a", 1);
        observed.set("b", 2);
        observed.set("a", 3);

        assert_eq!(calls.get(), 3);
        assert_eq!(observed.get("a"), Some(json!(3)));
    }

    #[test]
    fn reads_do_not_fire() {
        let (observed, calls) = counting(json!({"a": 1}));

        let _ = observed.get("a");
        let _ = observed.snapshot();
        let _ = observed.len();

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn array_mutations_fire_once_each() {
        let (observed, calls) = counting(json!([1, 2]));

        observed.push(3);
        observed.set_index(0, 9);

        assert_eq!(calls.get(), 2);
        assert_eq!(observed.items(), [json!(9), json!(2), json!(3)]);
    }

    #[test]
    fn rejected_writes_do_not_fire() {
        let (observed, calls) = counting(json!({"a": 1}));

        observed.push(1);
        observed.set_index(0, 1);

        assert_eq!(calls.get(), 0);
        assert_eq!(observed.get("a"), Some(json!(1)));
    }

    #[test]
    fn primitive_target_degrades_without_panicking() {
        let (observed, calls) = counting(json!(42));

        observed.set("a", 1);
        assert_eq!(calls.get(), 0);
        assert_eq!(observed.snapshot(), json!(42));
    }

    #[test]
    fn remove_fires_only_when_something_was_removed() {
        let (observed, calls) = counting(json!({"a": 1}));

        assert_eq!(observed.remove("missing"), None);
        assert_eq!(calls.get(), 0);
        assert_eq!(observed.remove("a"), Some(json!(1)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn clones_share_state() {
        let (observed, calls) = counting(json!({}));
        let alias = observed.clone();

        alias.set("k", "v");
        assert_eq!(observed.get("k"), Some(json!("v")));
        assert_eq!(calls.get(), 1);
    }
}
