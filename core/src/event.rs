//! Event payloads and the handlers that receive them.
//!
//! Events are plain data: a name plus an optional detail value. The
//! document backend decides when to dispatch them; components attach
//! [`Handler`]s through props (any prop key with the `on` prefix becomes a
//! listener rather than an attribute).

use alloc::{rc::Rc, string::String};

use serde_json::Value;

/// A dispatched event: its name (`"click"`, `"input"`, ...) and an
/// optional payload.
#[derive(Debug, Clone)]
pub struct Event {
    /// The event name, already lowercased by the dispatching side.
    pub name: String,
    /// Extra data carried by the event; [`Value::Null`] when absent.
    pub detail: Value,
}

impl Event {
    /// Creates an event with no detail payload.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Value::Null,
        }
    }

    /// Creates an event carrying a detail payload.
    #[must_use]
    pub fn with_detail(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
        }
    }
}

/// A cloneable event callback.
///
/// Handlers are reference-counted so the same callback can live in a props
/// map, a virtual node, and the document's listener table at once.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl_debug!(Handler);

impl Handler {
    /// Wraps a closure as a handler.
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the handler with the given event.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use serde_json::json;

    use super::{Event, Handler};

    #[test]
    fn handler_receives_event() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let handler = Handler::new({
            let seen = Rc::clone(&seen);
            move |event: &Event| seen.borrow_mut().push(event.detail.clone())
        });

        handler.call(&Event::with_detail("click", json!(3)));
        handler.call(&Event::new("click"));

        assert_eq!(&*seen.borrow(), &[json!(3), json!(null)]);
    }
}
