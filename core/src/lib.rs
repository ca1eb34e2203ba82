#![no_std]

//! Core building blocks for the ripple framework.
//!
//! This crate holds everything a backend needs to talk about a user
//! interface without owning one: the virtual node tree and its hyperscript
//! builders, the observable [`Store`] driving shared state, the [`Observed`]
//! wrapper driving per-instance state, the injection [`Registry`], and the
//! [`Context`] capability set handed to every component instance.
//!
//! The crate is `no_std` + `alloc`: nothing here touches a document, a
//! clock, or a thread. Rendering lives in `ripple-dom`.

extern crate alloc;

#[macro_use]
mod macros;

pub mod context;
pub mod event;
pub mod props;
pub mod reactive;
pub mod registry;
pub mod store;
pub mod vnode;

#[doc(inline)]
pub use context::{Context, Updater};
#[doc(inline)]
pub use event::{Event, Handler};
#[doc(inline)]
pub use props::{PropValue, Props};
#[doc(inline)]
pub use reactive::Observed;
#[doc(inline)]
pub use registry::Registry;
#[doc(inline)]
pub use store::{Store, StoreData, SubscriberFn, Subscription};
#[doc(inline)]
pub use vnode::{Child, Component, RenderFn, VComponent, VElement, VNode, component, fragment, h, text};

pub use serde_json::{Map, Value};
