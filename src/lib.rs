#![doc = include_str!("../README.md")]

pub mod adapter;
pub mod app;
pub mod bindings;
pub mod logging;

#[doc(inline)]
pub use app::{App, AppConfig, MountedView};

#[doc(inline)]
pub use ripple_core::{
    Child, Component, Context, Event, Handler, Map, Observed, PropValue, Props, Registry,
    RenderFn, Store, StoreData, Subscription, Updater, VComponent, VElement, VNode, Value,
    children, component, fragment, h, props, text,
};
#[doc(inline)]
pub use ripple_dom::{
    Dom, DomError, KEY_ATTRIBUTE, NodeId, Renderer, SKIP_ATTRIBUTE, to_html,
};
#[doc(inline)]
pub use ripple_router::{Location, Route, RouteParams, Router, RouterConfig};

pub mod prelude {
    //! The working set, importable in one line.
    //!
    //! ```
    //! use ripple::prelude::*;
    //!
    //! fn view() -> VNode {
    //!     h("p", Props::new(), children!["hello"])
    //! }
    //! # let _ = view();
    //! ```

    pub use crate::adapter::{StoreComponent, WithStore};
    pub use crate::app::{App, AppConfig, MountedView};
    pub use crate::bindings::{BindingSet, BindingSpec, Direction, InputBinding, OutputBinding};

    pub use ripple_core::{
        Child, Component, Context, Event, Handler, Observed, PropValue, Props, Registry,
        RenderFn, Store, StoreData, Subscription, Updater, VNode, Value, children, component,
        fragment, h, props, text,
    };
    pub use ripple_dom::{
        Dom, DomError, KEY_ATTRIBUTE, NodeId, Renderer, SKIP_ATTRIBUTE, to_html,
    };
    pub use ripple_router::{
        Callback, Location, Mode, Route, RouteHandler, RouteParams, Router, RouterConfig,
    };
}
