//! DOM errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// Error returned by an event listener or lifecycle hook.
///
/// Boxed so every component can surface its own error type through the
/// shared dispatch path.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("Hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Invalid node type for the operation
    #[error("Invalid node type: {0}")]
    InvalidNodeType(NodeId),

    /// Node is not a child of the given parent
    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
