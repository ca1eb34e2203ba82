//! Errors reported by document operations.

use thiserror::Error;

use crate::document::NodeId;

/// A document operation was asked to work on a node it cannot.
///
/// These surface caller misuse of node handles. The render core itself
/// never turns one of these into a fatal path — re-render failures are
/// reported through the diagnostic channel and rendering continues.
#[derive(Debug, Error)]
pub enum DomError {
    /// The node does not exist in this document (never created, or already
    /// destroyed).
    #[error("node {0:?} does not exist in this document")]
    NodeNotFound(NodeId),

    /// The operation needs an element, but the node is a text node.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// The operation needs a text node, but the node is an element.
    #[error("node {0:?} is not a text node")]
    NotAText(NodeId),

    /// The node is not a child of the given parent.
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The node that was expected to be a child.
        child: NodeId,
        /// The parent it was expected under.
        parent: NodeId,
    },
}
