//! The in-memory document tree.
//!
//! Nodes live in a slab arena and are addressed by [`NodeId`]; freed slots
//! are reused, so a destroyed node's id may later name a different node.
//! The cloneable [`Dom`] handle provides shared single-threaded access and
//! is careful to release its borrow of the arena before running any user
//! callback (event listeners, removal hooks) — callbacks may therefore
//! freely mutate the document they were fired from.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use ripple_core::{Event, Handler};

use crate::error::DomError;

/// Identifier for a node stored inside a [`Document`].
///
/// Ids are generational: destroying a node retires its id even if the
/// underlying slot is later reused, so a stale handle can never alias a
/// newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    const fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the raw slot index backing this identifier.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

/// A teardown callback fired when its node leaves the document.
pub type RemovalHook = Box<dyn FnOnce()>;

enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        listeners: BTreeMap<String, Vec<Handler>>,
    },
    Text(String),
}

struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    removal_hooks: Vec<RemovalHook>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
            removal_hooks: Vec::new(),
        }
    }
}

struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// Arena storing the live node tree.
#[derive(Default)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").field("nodes", &self.len()).finish()
    }
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, data: NodeData) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.data = Some(data);
            NodeId::new(index, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 0,
                data: Some(data),
            });
            NodeId::new(self.slots.len() - 1, 0)
        }
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
            .ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
            .ok_or(DomError::NodeNotFound(id))
    }

    /// Creates a detached element node.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.allocate(NodeData::new(NodeKind::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            listeners: BTreeMap::new(),
        }))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.allocate(NodeData::new(NodeKind::Text(text.into())))
    }

    /// Returns `true` when the node currently exists.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Returns the tag of an element node, `None` for text nodes or
    /// unknown ids.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<String> {
        match &self.node(id).ok()?.kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Returns `true` when the node is a text node.
    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).map(|data| &data.kind),
            Ok(NodeKind::Text(_))
        )
    }

    /// Returns the content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<String> {
        match &self.node(id).ok()?.kind {
            NodeKind::Text(text) => Some(text.clone()),
            NodeKind::Element { .. } => None,
        }
    }

    /// Replaces the content of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(current) => {
                *current = text.into();
                Ok(())
            }
            NodeKind::Element { .. } => Err(DomError::NotAText(id)),
        }
    }

    /// Reads one attribute of an element node.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        match &self.node(id).ok()?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).cloned(),
            NodeKind::Text(_) => None,
        }
    }

    /// Snapshots the attributes of an element node; empty for anything
    /// else.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> BTreeMap<String, String> {
        match self.node(id).map(|data| &data.kind) {
            Ok(NodeKind::Element { attributes, .. }) => attributes.clone(),
            _ => BTreeMap::new(),
        }
    }

    /// Sets an attribute on an element node.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.insert(name.into(), value.into());
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    /// Removes an attribute from an element node.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.remove(name);
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    /// Attaches an event listener to an element node.
    pub fn add_listener(
        &mut self,
        id: NodeId,
        event: impl Into<String>,
        handler: Handler,
    ) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { listeners, .. } => {
                listeners.entry(event.into()).or_default().push(handler);
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    /// Clones out the listeners registered for one event name.
    #[must_use]
    pub fn listeners(&self, id: NodeId, event: &str) -> Vec<Handler> {
        match self.node(id).map(|data| &data.kind) {
            Ok(NodeKind::Element { listeners, .. }) => {
                listeners.get(event).cloned().unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// Removes and returns the whole listener table of an element node.
    pub fn take_listeners(
        &mut self,
        id: NodeId,
    ) -> Result<BTreeMap<String, Vec<Handler>>, DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { listeners, .. } => Ok(std::mem::take(listeners)),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    /// Replaces the whole listener table of an element node.
    pub fn set_listeners(
        &mut self,
        id: NodeId,
        table: BTreeMap<String, Vec<Handler>>,
    ) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { listeners, .. } => {
                *listeners = table;
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    /// Registers a teardown hook fired when the node leaves the document.
    pub fn on_remove(&mut self, id: NodeId, hook: RemovalHook) -> Result<(), DomError> {
        self.node_mut(id)?.removal_hooks.push(hook);
        Ok(())
    }

    /// Returns the parent, if the node is attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    /// Snapshots the child list of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).map(|data| data.children.clone()).unwrap_or_default()
    }

    /// Appends a child, detaching it from any previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        self.detach(child);
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detaches and returns every child of a node. The children stay alive.
    pub fn take_children(&mut self, parent: NodeId) -> Result<Vec<NodeId>, DomError> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        for &child in &children {
            if let Ok(data) = self.node_mut(child) {
                data.parent = None;
            }
        }
        Ok(children)
    }

    /// Replaces the child list of a node, reparenting every entry.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<(), DomError> {
        self.node(parent)?;
        for &child in &children {
            self.detach(child);
            self.node_mut(child)?.parent = Some(parent);
        }
        self.node_mut(parent)?.children = children;
        Ok(())
    }

    /// Replaces `old` with `new` in `parent`'s child list, keeping the
    /// position. `old` is detached but stays alive.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), DomError> {
        self.node(new)?;
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|&child| child == old)
            .ok_or(DomError::NotAChild { child: old, parent })?;
        self.detach(new);
        self.node_mut(parent)?.children[position] = new;
        self.node_mut(new)?.parent = Some(parent);
        if let Ok(data) = self.node_mut(old) {
            data.parent = None;
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        let Ok(data) = self.node_mut(child) else { return };
        let Some(parent) = data.parent.take() else { return };
        if let Ok(parent_data) = self.node_mut(parent) {
            parent_data.children.retain(|&c| c != child);
        }
    }

    /// Removes a node and its whole subtree from the document, returning
    /// the removal hooks to fire (innermost first). The caller runs them —
    /// see [`Dom::destroy`] — so that hooks never observe a held borrow.
    pub fn destroy(&mut self, id: NodeId) -> Vec<RemovalHook> {
        self.detach(id);
        let mut hooks = Vec::new();
        self.collect(id, &mut hooks);
        hooks
    }

    fn collect(&mut self, id: NodeId, hooks: &mut Vec<RemovalHook>) {
        let Some(slot) = self.slots.get_mut(id.index) else {
            return;
        };
        if slot.generation != id.generation {
            return;
        }
        let Some(mut data) = slot.data.take() else {
            return;
        };
        // Retire the id: a reused slot mints a fresh generation.
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        for child in std::mem::take(&mut data.children) {
            self.collect(child, hooks);
        }
        hooks.append(&mut data.removal_hooks);
    }

    /// Concatenates the text content of a subtree.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let Ok(data) = self.node(id) else {
            return String::new();
        };
        match &data.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => data
                .children
                .iter()
                .map(|&child| self.text_content(child))
                .collect(),
        }
    }

    /// Structural equality of two subtrees: kind, tag, attributes, text,
    /// and children, in order. Event listeners are not compared.
    #[must_use]
    pub fn is_equal(&self, a: NodeId, b: NodeId) -> bool {
        let (Ok(left), Ok(right)) = (self.node(a), self.node(b)) else {
            return false;
        };
        let shallow = match (&left.kind, &right.kind) {
            (NodeKind::Text(a), NodeKind::Text(b)) => a == b,
            (
                NodeKind::Element {
                    tag: tag_a,
                    attributes: attrs_a,
                    ..
                },
                NodeKind::Element {
                    tag: tag_b,
                    attributes: attrs_b,
                    ..
                },
            ) => tag_a == tag_b && attrs_a == attrs_b,
            _ => false,
        };
        shallow
            && left.children.len() == right.children.len()
            && left
                .children
                .iter()
                .zip(&right.children)
                .all(|(&a, &b)| self.is_equal(a, b))
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.data.is_some()).count()
    }

    /// Returns `true` when the document holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cloneable, shared handle to a [`Document`].
///
/// All mutation goes through this handle; it releases the arena borrow
/// before invoking listeners or removal hooks.
#[derive(Debug, Clone, Default)]
pub struct Dom(Rc<RefCell<Document>>);

impl Dom {
    /// Creates a handle to a fresh, empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element node.
    pub fn create_element(&self, tag: impl Into<String>) -> NodeId {
        self.0.borrow_mut().create_element(tag)
    }

    /// Creates a detached text node.
    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.0.borrow_mut().create_text(text)
    }

    /// Returns `true` when the node currently exists.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.0.borrow().contains(id)
    }

    /// Returns the tag of an element node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<String> {
        self.0.borrow().tag(id)
    }

    /// Returns `true` when the node is a text node.
    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        self.0.borrow().is_text(id)
    }

    /// Returns the content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<String> {
        self.0.borrow().text(id)
    }

    /// Replaces the content of a text node.
    pub fn set_text(&self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        self.0.borrow_mut().set_text(id, text)
    }

    /// Reads one attribute of an element node.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.0.borrow().attribute(id, name)
    }

    /// Snapshots the attributes of an element node.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> BTreeMap<String, String> {
        self.0.borrow().attributes(id)
    }

    /// Sets an attribute on an element node.
    pub fn set_attribute(
        &self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.0.borrow_mut().set_attribute(id, name, value)
    }

    /// Removes an attribute from an element node.
    pub fn remove_attribute(&self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.0.borrow_mut().remove_attribute(id, name)
    }

    /// Attaches an event listener to an element node.
    pub fn add_listener(
        &self,
        id: NodeId,
        event: impl Into<String>,
        handler: Handler,
    ) -> Result<(), DomError> {
        self.0.borrow_mut().add_listener(id, event, handler)
    }

    /// Clones out the listeners registered for one event name.
    #[must_use]
    pub fn listeners(&self, id: NodeId, event: &str) -> Vec<Handler> {
        self.0.borrow().listeners(id, event)
    }

    /// Removes and returns the whole listener table of an element node.
    pub fn take_listeners(&self, id: NodeId) -> Result<BTreeMap<String, Vec<Handler>>, DomError> {
        self.0.borrow_mut().take_listeners(id)
    }

    /// Replaces the whole listener table of an element node.
    pub fn set_listeners(
        &self,
        id: NodeId,
        table: BTreeMap<String, Vec<Handler>>,
    ) -> Result<(), DomError> {
        self.0.borrow_mut().set_listeners(id, table)
    }

    /// Registers a teardown hook fired when the node leaves the document.
    pub fn on_remove(&self, id: NodeId, hook: impl FnOnce() + 'static) -> Result<(), DomError> {
        self.0.borrow_mut().on_remove(id, Box::new(hook))
    }

    /// Returns the parent, if the node is attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.0.borrow().parent(id)
    }

    /// Snapshots the child list of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.0.borrow().children(id)
    }

    /// Appends a child, detaching it from any previous parent first.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.0.borrow_mut().append_child(parent, child)
    }

    /// Detaches and returns every child of a node.
    pub fn take_children(&self, parent: NodeId) -> Result<Vec<NodeId>, DomError> {
        self.0.borrow_mut().take_children(parent)
    }

    /// Replaces the child list of a node.
    pub fn set_children(&self, parent: NodeId, children: Vec<NodeId>) -> Result<(), DomError> {
        self.0.borrow_mut().set_children(parent, children)
    }

    /// Replaces `old` with `new` in `parent`'s child list.
    pub fn replace_child(&self, parent: NodeId, old: NodeId, new: NodeId) -> Result<(), DomError> {
        self.0.borrow_mut().replace_child(parent, old, new)
    }

    /// Removes a node and its subtree, then fires the collected removal
    /// hooks (innermost first) with no borrow held.
    pub fn destroy(&self, id: NodeId) {
        let hooks = self.0.borrow_mut().destroy(id);
        for hook in hooks {
            hook();
        }
    }

    /// Dispatches an event to the target's listeners, returning how many
    /// ran. Listeners are cloned out before any of them is invoked, so they
    /// may mutate the document (and the listener table) freely.
    pub fn dispatch(&self, target: NodeId, event: &Event) -> Result<usize, DomError> {
        let listeners = {
            let document = self.0.borrow();
            if !document.contains(target) {
                return Err(DomError::NodeNotFound(target));
            }
            document.listeners(target, &event.name)
        };
        for listener in &listeners {
            listener.call(event);
        }
        Ok(listeners.len())
    }

    /// Concatenates the text content of a subtree.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.0.borrow().text_content(id)
    }

    /// Structural equality of two subtrees (listeners not compared).
    #[must_use]
    pub fn is_equal(&self, a: NodeId, b: NodeId) -> bool {
        self.0.borrow().is_equal(a, b)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` when the document holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use ripple_core::{Event, Handler};

    use super::Dom;

    #[test]
    fn builds_and_reads_a_small_tree() {
        let dom = Dom::new();
        let root = dom.create_element("div");
        let label = dom.create_text("hello ");
        let strong = dom.create_element("strong");
        let name = dom.create_text("world");

        dom.append_child(root, label).unwrap();
        dom.append_child(root, strong).unwrap();
        dom.append_child(strong, name).unwrap();

        assert_eq!(dom.tag(root), Some("div".into()));
        assert_eq!(dom.children(root), [label, strong]);
        assert_eq!(dom.parent(name), Some(strong));
        assert_eq!(dom.text_content(root), "hello world");
    }

    #[test]
    fn destroy_frees_the_subtree_and_fires_hooks_innermost_first() {
        let dom = Dom::new();
        let root = dom.create_element("div");
        let child = dom.create_element("span");
        dom.append_child(root, child).unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        dom.on_remove(root, {
            let order = Rc::clone(&order);
            move || order.borrow_mut().push("root")
        })
        .unwrap();
        dom.on_remove(child, {
            let order = Rc::clone(&order);
            move || order.borrow_mut().push("child")
        })
        .unwrap();

        dom.destroy(root);
        assert_eq!(&*order.borrow(), &["child", "root"]);
        assert!(!dom.contains(root));
        assert!(!dom.contains(child));
        assert!(dom.is_empty());
    }

    #[test]
    fn removal_hooks_may_mutate_the_document() {
        let dom = Dom::new();
        let doomed = dom.create_element("div");
        let created = Rc::new(Cell::new(false));

        dom.on_remove(doomed, {
            let dom = dom.clone();
            let created = Rc::clone(&created);
            move || {
                let _ = dom.create_element("p");
                created.set(true);
            }
        })
        .unwrap();

        dom.destroy(doomed);
        assert!(created.get());
        assert_eq!(dom.len(), 1);
    }

    #[test]
    fn dispatch_runs_every_listener_for_the_event() {
        let dom = Dom::new();
        let button = dom.create_element("button");
        let clicks = Rc::new(Cell::new(0));

        for _ in 0..2 {
            dom.add_listener(button, "click", {
                let clicks = Rc::clone(&clicks);
                Handler::new(move |_| clicks.set(clicks.get() + 1))
            })
            .unwrap();
        }

        let ran = dom.dispatch(button, &Event::new("click")).unwrap();
        assert_eq!(ran, 2);
        assert_eq!(clicks.get(), 2);
        assert_eq!(dom.dispatch(button, &Event::new("keydown")).unwrap(), 0);
    }

    #[test]
    fn listeners_may_mutate_the_document_during_dispatch() {
        let dom = Dom::new();
        let button = dom.create_element("button");

        dom.add_listener(button, "click", {
            let dom = dom.clone();
            Handler::new(move |_| {
                let extra = dom.create_element("span");
                dom.append_child(button, extra).unwrap();
            })
        })
        .unwrap();

        dom.dispatch(button, &Event::new("click")).unwrap();
        assert_eq!(dom.children(button).len(), 1);
    }

    #[test]
    fn replace_child_keeps_the_position() {
        let dom = Dom::new();
        let root = dom.create_element("div");
        let first = dom.create_text("a");
        let second = dom.create_text("b");
        let replacement = dom.create_text("x");
        dom.append_child(root, first).unwrap();
        dom.append_child(root, second).unwrap();

        dom.replace_child(root, first, replacement).unwrap();
        assert_eq!(dom.children(root), [replacement, second]);
        assert_eq!(dom.parent(first), None);
        assert!(dom.contains(first));
    }

    #[test]
    fn is_equal_compares_structure_not_listeners() {
        let dom = Dom::new();
        let a = dom.create_element("div");
        let b = dom.create_element("div");
        dom.set_attribute(a, "class", "x").unwrap();
        dom.set_attribute(b, "class", "x").unwrap();
        dom.add_listener(a, "click", Handler::new(|_| {})).unwrap();

        assert!(dom.is_equal(a, b));

        dom.set_attribute(b, "class", "y").unwrap();
        assert!(!dom.is_equal(a, b));
    }

    #[test]
    fn freed_slots_are_reused_without_resurrecting_stale_ids() {
        let dom = Dom::new();
        let first = dom.create_element("div");
        dom.destroy(first);

        let second = dom.create_element("p");
        assert_eq!(second.index(), first.index());
        assert_ne!(first, second);
        assert!(!dom.contains(first));
        assert!(dom.contains(second));
        assert!(dom.set_attribute(first, "class", "stale").is_err());
    }
}
