//! In-place reconciliation of live subtrees.
//!
//! [`morph`] merges a freshly materialized subtree (`to`) into the live one
//! (`from`), mutating as little as possible: deep-equal subtrees are left
//! alone, same-tag elements are patched attribute by attribute, children
//! are matched by key and then by position, and only the leftovers are
//! replaced. Whatever survives of the fresh tree after the merge is
//! destroyed, so resources held by its nodes (store subscriptions of
//! short-lived component instances, for one) release immediately.

use std::collections::BTreeMap;

use crate::document::{Dom, NodeId};
use crate::error::DomError;

/// Attribute carrying a node's identity across renders. Children with
/// matching keys are patched into each other even after reordering.
pub const KEY_ATTRIBUTE: &str = "data-key";

/// Attribute suppressing updates: when a replacement node carries it, the
/// live node is left untouched even if the two differ structurally.
pub const SKIP_ATTRIBUTE: &str = "data-skip";

/// Merges `to` into `from`, returning the node that now stands where
/// `from` stood — `from` itself when it could be patched, `to` when it had
/// to be replaced wholesale. The `to` subtree is consumed either way.
pub fn morph(dom: &Dom, from: NodeId, to: NodeId) -> Result<NodeId, DomError> {
    if dom.attribute(to, SKIP_ATTRIBUTE).is_some() {
        dom.destroy(to);
        return Ok(from);
    }
    if dom.is_equal(from, to) {
        dom.destroy(to);
        return Ok(from);
    }
    match (dom.tag(from), dom.tag(to)) {
        (None, None) => {
            if let Some(text) = dom.text(to) {
                dom.set_text(from, text)?;
            }
            dom.destroy(to);
            Ok(from)
        }
        (Some(from_tag), Some(to_tag)) if from_tag == to_tag => {
            reconcile_attributes(dom, from, to)?;
            let listeners = dom.take_listeners(to)?;
            dom.set_listeners(from, listeners)?;
            morph_children(dom, from, to)?;
            dom.destroy(to);
            Ok(from)
        }
        _ => replace(dom, from, to),
    }
}

fn replace(dom: &Dom, from: NodeId, to: NodeId) -> Result<NodeId, DomError> {
    if let Some(parent) = dom.parent(from) {
        dom.replace_child(parent, from, to)?;
    }
    dom.destroy(from);
    Ok(to)
}

fn reconcile_attributes(dom: &Dom, from: NodeId, to: NodeId) -> Result<(), DomError> {
    let target = dom.attributes(to);
    for name in dom.attributes(from).into_keys() {
        if !target.contains_key(&name) {
            dom.remove_attribute(from, &name)?;
        }
    }
    for (name, value) in target {
        if dom.attribute(from, &name).as_deref() != Some(value.as_str()) {
            dom.set_attribute(from, &name, value)?;
        }
    }
    Ok(())
}

fn morph_children(dom: &Dom, from: NodeId, to: NodeId) -> Result<(), DomError> {
    let from_children = dom.take_children(from)?;
    let to_children = dom.take_children(to)?;

    let mut used = vec![false; from_children.len()];
    let mut keyed: BTreeMap<String, usize> = BTreeMap::new();
    for (index, &child) in from_children.iter().enumerate() {
        if let Some(key) = dom.attribute(child, KEY_ATTRIBUTE) {
            keyed.entry(key).or_insert(index);
        }
    }

    let mut next = Vec::with_capacity(to_children.len());
    let mut cursor = 0;
    for to_child in to_children {
        if let Some(key) = dom.attribute(to_child, KEY_ATTRIBUTE) {
            match keyed.get(&key) {
                Some(&index) if !used[index] => {
                    used[index] = true;
                    next.push(morph(dom, from_children[index], to_child)?);
                }
                _ => next.push(to_child),
            }
            continue;
        }

        // Positionally consume the next live child that is not reserved
        // for key matching.
        let mut candidate = None;
        while cursor < from_children.len() {
            let index = cursor;
            cursor += 1;
            if used[index] || dom.attribute(from_children[index], KEY_ATTRIBUTE).is_some() {
                continue;
            }
            used[index] = true;
            candidate = Some(from_children[index]);
            break;
        }
        match candidate {
            Some(live) => next.push(morph(dom, live, to_child)?),
            None => next.push(to_child),
        }
    }

    for (index, &child) in from_children.iter().enumerate() {
        if !used[index] {
            dom.destroy(child);
        }
    }
    dom.set_children(from, next)?;
    Ok(())
}
