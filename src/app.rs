//! The application root.
//!
//! An [`App`] explicitly constructs and owns the pieces a mounted tree
//! shares: the document, the store, and the registry. Nothing here is a
//! module-level singleton — two apps in one process (or one test) never
//! observe each other. Teardown is explicit, too: mounted instances keep
//! their store subscriptions (and with them the document) alive until
//! [`App::unmount`] or [`App::clear`] removes them.

use ripple_core::{Component, Props, Registry, Store, StoreData, VNode};
use ripple_dom::{Dom, DomError, NodeId, Renderer, to_html};

/// Construction-time application options.
#[derive(Debug)]
pub struct AppConfig {
    /// Data the store is seeded with; no notification fires for it.
    pub initial_data: StoreData,
    /// Tag of the root element everything mounts under.
    pub root_tag: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_data: StoreData::new(),
            root_tag: "body".into(),
        }
    }
}

/// An application: one document, one store, one registry.
#[derive(Debug, Clone)]
pub struct App {
    dom: Dom,
    store: Store,
    registry: Registry,
    root: NodeId,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates an app with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Creates an app from explicit options.
    #[must_use]
    pub fn with_config(config: AppConfig) -> Self {
        let dom = Dom::new();
        let root = dom.create_element(config.root_tag);
        Self {
            dom,
            store: Store::with_data(config.initial_data),
            registry: Registry::new(),
            root,
        }
    }

    /// The shared data store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The injection registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The document.
    #[must_use]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// The root element everything mounts under.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// A renderer over this app's document, store, and registry.
    #[must_use]
    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.dom.clone(), self.store.clone(), self.registry.clone())
    }

    /// Materializes a virtual tree, returning the detached root node. The
    /// caller decides where to append it.
    ///
    /// # Errors
    ///
    /// Returns an error when a document operation is handed a stale node.
    pub fn render(&self, node: &VNode) -> Result<NodeId, DomError> {
        self.renderer().render(node)
    }

    /// Instantiates a component under the app root.
    ///
    /// # Errors
    ///
    /// Returns an error when a document operation is handed a stale node.
    pub fn mount(&self, component: Component, props: Props) -> Result<MountedView, DomError> {
        let node = self
            .renderer()
            .render(&ripple_core::component(component, props))?;
        self.dom.append_child(self.root, node)?;
        Ok(MountedView {
            dom: self.dom.clone(),
            node,
        })
    }

    /// Removes a mounted subtree, firing its teardown hooks (store
    /// subscriptions of the instances inside it release here).
    pub fn unmount(&self, view: MountedView) {
        view.dom.destroy(view.node);
    }

    /// Removes everything mounted under the root.
    pub fn clear(&self) {
        for child in self.dom.children(self.root) {
            self.dom.destroy(child);
        }
    }

    /// The text content of the whole tree.
    #[must_use]
    pub fn text(&self) -> String {
        self.dom.text_content(self.root)
    }

    /// The tree serialized as HTML-style markup.
    #[must_use]
    pub fn html(&self) -> String {
        to_html(&self.dom, self.root)
    }
}

/// A live handle to a mounted component subtree.
///
/// The handle names the instance's root node as it was mounted. The morph
/// pass patches that node in place, so the handle stays valid across
/// re-renders as long as the instance keeps its root tag.
#[derive(Debug)]
pub struct MountedView {
    dom: Dom,
    node: NodeId,
}

impl MountedView {
    /// The root node of the mounted subtree.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Returns `true` while the subtree is still in the document.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.dom.contains(self.node)
    }

    /// The text content of the subtree.
    #[must_use]
    pub fn text(&self) -> String {
        self.dom.text_content(self.node)
    }

    /// The subtree serialized as HTML-style markup.
    #[must_use]
    pub fn html(&self) -> String {
        to_html(&self.dom, self.node)
    }
}
