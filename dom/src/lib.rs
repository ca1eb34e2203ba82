//! The document backend of the ripple framework.
//!
//! This crate owns the live tree: an arena [`Document`] of element and text
//! nodes behind the shared [`Dom`] handle, the [`Renderer`] that
//! materializes virtual nodes into it (instantiating component functions
//! and keeping their re-render closures subscribed to the store), and the
//! [`morph`] pass that patches live subtrees in place on re-render —
//! preserving node identity through the [`KEY_ATTRIBUTE`] and honoring the
//! [`SKIP_ATTRIBUTE`] escape hatch.

pub mod document;
pub mod error;
pub mod html;
pub mod materialize;
pub mod morph;

#[doc(inline)]
pub use document::{Document, Dom, NodeId};
#[doc(inline)]
pub use error::DomError;
#[doc(inline)]
pub use html::to_html;
#[doc(inline)]
pub use materialize::{EVENT_PREFIX, Renderer};
#[doc(inline)]
pub use morph::{KEY_ATTRIBUTE, SKIP_ATTRIBUTE, morph};
