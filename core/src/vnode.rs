//! The virtual node tree and its hyperscript builders.
//!
//! Virtual nodes are produced fresh on every render, compared against the
//! live document by the differ, and discarded. They are plain data — all
//! the behavior lives in the materializer.

use alloc::{boxed::Box, string::{String, ToString}, vec::Vec};
use core::fmt;

use serde_json::Value;

use crate::{context::Context, props::Props};

/// The per-instance render closure a component definition returns.
///
/// Invoked once for the initial tree and again on every re-render request.
/// It must yield exactly one root node; a [`VNode::Fragment`] result is a
/// reported contract violation.
pub type RenderFn = Box<dyn FnMut() -> VNode>;

/// A component definition.
///
/// Called once per instance with the instance's props and its [`Context`]
/// capability set, returning the render closure. The two-stage call is what
/// lets a component close over instance state while staying re-invocable.
pub type Component = fn(Props, Context) -> RenderFn;

/// A lightweight description of a document node or component instantiation.
#[derive(Debug, Clone)]
pub enum VNode {
    /// A text node holding the string form of a primitive.
    Text(String),
    /// An element with a tag, props, and children.
    Element(VElement),
    /// A component to instantiate in place.
    Component(VComponent),
    /// Several root nodes at once. Only valid where a caller explicitly
    /// splices children; as a render root it is a reported error.
    Fragment(Vec<VNode>),
}

/// The element variant of a [`VNode`].
#[derive(Debug, Clone)]
pub struct VElement {
    /// Element tag, e.g. `"div"`.
    pub tag: String,
    /// Attributes and event handlers.
    pub props: Props,
    /// Child nodes, already flattened.
    pub children: Vec<VNode>,
}

/// The component variant of a [`VNode`].
#[derive(Clone)]
pub struct VComponent {
    /// The definition function to instantiate.
    pub component: Component,
    /// Props handed to the instance.
    pub props: Props,
}

impl fmt::Debug for VComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VComponent")
            .field("component", &"fn(..)")
            .field("props", &self.props)
            .finish()
    }
}

/// A child list accepted by [`h`] and [`fragment`].
pub type Children = Vec<Child>;

/// One entry of a child list: a single node, or a sequence that gets
/// flattened one level into the parent's children.
#[derive(Debug, Clone)]
pub enum Child {
    /// A single child node.
    Node(VNode),
    /// A nested sequence, spliced into the parent.
    Nodes(Vec<VNode>),
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Self::Node(node)
    }
}

impl From<Vec<VNode>> for Child {
    fn from(nodes: Vec<VNode>) -> Self {
        Self::Nodes(nodes)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Node(text(value))
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Node(text(value))
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Self::Node(text(value))
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Self::Node(text(value))
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Self::Node(text(value))
    }
}

impl From<Value> for Child {
    fn from(value: Value) -> Self {
        Self::Node(VNode::Text(value_text(&value)))
    }
}

/// The string form of a value, as it appears in text nodes and attributes:
/// strings verbatim, everything else through its display form.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn flatten(children: impl IntoIterator<Item = Child>) -> Vec<VNode> {
    let mut flat = Vec::new();
    for child in children {
        match child {
            Child::Node(node) => flat.push(node),
            Child::Nodes(nodes) => flat.extend(nodes),
        }
    }
    flat
}

/// Builds an element node from a tag, props, and a child list.
///
/// Nested child sequences are flattened one level; deeper nesting is kept
/// as the caller wrote it.
pub fn h(tag: impl Into<String>, props: Props, children: impl IntoIterator<Item = Child>) -> VNode {
    VNode::Element(VElement {
        tag: tag.into(),
        props,
        children: flatten(children),
    })
}

/// Builds a text node from any primitive.
pub fn text(content: impl Into<Value>) -> VNode {
    VNode::Text(value_text(&content.into()))
}

/// Builds a component node.
#[must_use]
pub fn component(component: Component, props: Props) -> VNode {
    VNode::Component(VComponent { component, props })
}

/// Builds a multi-root node for positions where a caller splices children.
pub fn fragment(children: impl IntoIterator<Item = Child>) -> VNode {
    VNode::Fragment(flatten(children))
}

#[cfg(test)]
mod tests {
    use alloc::{format, vec};

    use super::{Child, VNode, h, text, value_text};
    use crate::props::Props;

    #[test]
    fn children_flatten_one_level() {
        let items = vec![text("a"), text("b")];
        let node = h("ul", Props::new(), children![items, text("c")]);

        let VNode::Element(element) = node else {
            panic!("expected an element");
        };
        assert_eq!(element.children.len(), 3);
    }

    #[test]
    fn nested_sequences_flatten_only_one_level() {
        let inner = vec![text("x")];
        let node = h(
            "div",
            Props::new(),
            vec![Child::from(vec![h("span", Props::new(), children![inner])])],
        );

        let VNode::Element(element) = node else {
            panic!("expected an element");
        };
        assert_eq!(element.children.len(), 1);
        let VNode::Element(span) = &element.children[0] else {
            panic!("expected the spliced span");
        };
        assert_eq!(span.children.len(), 1);
    }

    #[test]
    fn text_uses_the_string_form() {
        assert!(matches!(text("hi"), VNode::Text(s) if s == "hi"));
        assert!(matches!(text(1), VNode::Text(s) if s == "1"));
        assert!(matches!(text(1.5), VNode::Text(s) if s == "1.5"));
        assert!(matches!(text(true), VNode::Text(s) if s == "true"));
    }

    #[test]
    fn value_text_keeps_strings_unquoted() {
        assert_eq!(value_text(&serde_json::json!("plain")), "plain");
        assert_eq!(value_text(&serde_json::json!(7)), "7");
        assert_eq!(format!("{:?}", text("x")), "Text(\"x\")");
    }
}
