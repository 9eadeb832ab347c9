//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Domain errors represent structural misuse of a tree or an aborted traversal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("cycle detected: {child} cannot be added below {branch}")]
    CycleDetected { branch: NodeId, child: NodeId },

    #[error("node {child} is already attached to {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("node {child} is not a child of {branch}")]
    ChildNotFound { branch: NodeId, child: NodeId },

    #[error("traversal exceeded maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error("traversal cancelled after {visited} nodes")]
    Cancelled { visited: usize },
}

/// Result type for tree and traversal operations.
pub type DomainResult<T> = Result<T, DomainError>;
