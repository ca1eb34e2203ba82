//! HTML-style rendering of a subtree, for hosts and assertions.

use std::fmt::Write;

use crate::document::{Dom, NodeId};

/// Serializes a subtree as HTML-style markup.
///
/// Attributes appear in name order; text is escaped. This is a debugging
/// and testing surface, not a full serializer — every element gets a
/// closing tag, void elements included.
#[must_use]
pub fn to_html(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, node, &mut out);
    out
}

fn write_node(dom: &Dom, node: NodeId, out: &mut String) {
    if let Some(text) = dom.text(node) {
        out.push_str(&escape(&text));
        return;
    }
    let Some(tag) = dom.tag(node) else { return };

    out.push('<');
    out.push_str(&tag);
    for (name, value) in dom.attributes(node) {
        let _ = write!(out, " {name}=\"{}\"", escape(&value));
    }
    out.push('>');
    for child in dom.children(node) {
        write_node(dom, child, out);
    }
    let _ = write!(out, "</{tag}>");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
