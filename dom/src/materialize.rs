//! Turning virtual nodes into live document nodes.
//!
//! The [`Renderer`] owns the three shared handles a tree needs while it
//! renders: the document, the store, and the registry. Materializing a
//! component node is a two-stage call — the definition function runs once
//! per instance and returns the render closure, which is then invoked for
//! the first tree and re-invoked on every re-render request. Each instance
//! subscribes its re-render closure to the store; the subscription guard is
//! parked in a removal hook on the instance root, so unmounting the subtree
//! releases it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ripple_core::{
    Context, PropValue, Props, Registry, Store, Updater, VComponent, VElement, VNode, Value,
    vnode::value_text,
};

use crate::document::{Dom, NodeId};
use crate::error::DomError;
use crate::morph::morph;

/// Prop keys carrying this prefix are wired as event listeners rather than
/// attributes. Detection is case-sensitive; the event name is the rest of
/// the key, lowercased (`onClick` listens for `click`).
pub const EVENT_PREFIX: &str = "on";

/// Materializes virtual trees into a document and keeps instances live.
#[derive(Debug, Clone)]
pub struct Renderer {
    dom: Dom,
    store: Store,
    registry: Registry,
}

impl Renderer {
    /// Creates a renderer over the given document, store, and registry.
    #[must_use]
    pub fn new(dom: Dom, store: Store, registry: Registry) -> Self {
        Self {
            dom,
            store,
            registry,
        }
    }

    /// The document this renderer materializes into.
    #[must_use]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Materializes a virtual tree, returning the detached root node. The
    /// caller decides where to append it.
    pub fn render(&self, node: &VNode) -> Result<NodeId, DomError> {
        self.materialize(node)
    }

    fn materialize(&self, node: &VNode) -> Result<NodeId, DomError> {
        match node {
            VNode::Text(text) => Ok(self.dom.create_text(text.clone())),
            VNode::Element(element) => self.materialize_element(element),
            VNode::Component(component) => self.instantiate(component),
            VNode::Fragment(_) => {
                // A fragment where exactly one node must stand.
                let node = single_root(node.clone());
                self.materialize(&node)
            }
        }
    }

    fn materialize_element(&self, element: &VElement) -> Result<NodeId, DomError> {
        let node = self.dom.create_element(element.tag.clone());
        self.apply_props(node, &element.props)?;
        for child in &element.children {
            // Fragments in child position splice into the parent.
            if let VNode::Fragment(nodes) = child {
                for inner in nodes {
                    let inner = self.materialize(inner)?;
                    self.dom.append_child(node, inner)?;
                }
            } else {
                let child = self.materialize(child)?;
                self.dom.append_child(node, child)?;
            }
        }
        Ok(node)
    }

    fn apply_props(&self, node: NodeId, props: &Props) -> Result<(), DomError> {
        for (key, value) in props.entries() {
            match value {
                PropValue::Handler(handler) => {
                    if let Some(event) = event_name(&key) {
                        self.dom.add_listener(node, event, handler)?;
                    }
                    // A handler under a non-event key has no document form.
                }
                PropValue::Value(value) => {
                    if key == "checked" {
                        if is_truthy(&value) {
                            self.dom.set_attribute(node, key, value_text(&value))?;
                        }
                    } else if is_primitive(&value) {
                        self.dom.set_attribute(node, key, value_text(&value))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn instantiate(&self, component: &VComponent) -> Result<NodeId, DomError> {
        let updater = Updater::new();
        let context = Context::new(self.store.clone(), self.registry.clone(), updater.clone());
        let mut render = (component.component)(component.props.clone(), context);

        let first = single_root(render());
        let root = self.materialize(&first)?;

        let render = Rc::new(RefCell::new(render));
        let root_handle = Rc::new(Cell::new(root));

        let rerender: Rc<dyn Fn()> = Rc::new({
            let renderer = self.clone();
            let render = Rc::clone(&render);
            let root_handle = Rc::clone(&root_handle);
            move || {
                let fresh = match render.try_borrow_mut() {
                    Ok(mut render) => single_root((*render)()),
                    Err(_) => {
                        tracing::error!(
                            "re-render requested while this instance is already rendering; ignoring"
                        );
                        return;
                    }
                };
                let patched = renderer
                    .materialize(&fresh)
                    .and_then(|next| morph(renderer.dom(), root_handle.get(), next));
                match patched {
                    Ok(current) => root_handle.set(current),
                    Err(error) => tracing::error!("re-render failed: {error}"),
                }
            }
        });

        // Wired only now: the first render has been committed, so re-render
        // requests become valid from this point on.
        let subscription = self.store.watch({
            let rerender = Rc::clone(&rerender);
            move |_| rerender()
        });
        updater.connect(rerender);
        self.dom.on_remove(root, move || drop(subscription))?;

        Ok(root)
    }
}

/// Collapses a render result to exactly one root, reporting the contract
/// violation when a component returned several.
fn single_root(node: VNode) -> VNode {
    match node {
        VNode::Fragment(children) => {
            tracing::error!(
                "component render returned multiple root nodes; only one is allowed, using the first"
            );
            children
                .into_iter()
                .next()
                .unwrap_or_else(|| VNode::Text(String::new()))
        }
        node => node,
    }
}

fn event_name(key: &str) -> Option<String> {
    key.strip_prefix(EVENT_PREFIX).map(str::to_lowercase)
}

fn is_primitive(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_)
    )
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
