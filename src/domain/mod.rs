//! Domain layer: composite tree, visitor dispatch and traversal
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod policy;
pub mod traverse;
pub mod visitor;

pub use arena::{
    BranchId, LeafId, NodeId, NodeKind, PostOrderIterator, PreOrderIterator, TreeArena, TreeNode,
};
pub use error::{DomainError, DomainResult};
pub use policy::{CyclePolicy, RemovePolicy, TreePolicy};
pub use traverse::{traverse, walk_recursive, Traversal};
pub use visitor::{BranchView, LeafView, NodeView, Visitor};
