use generational_arena::{Arena, Index};
use std::fmt;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::policy::{CyclePolicy, RemovePolicy, TreePolicy};

/// Handle to any node in a [`TreeArena`].
///
/// Handles are generational: once a node is pruned its handle never
/// resolves again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "node {}.{}", slot, generation)
    }
}

/// Handle to a leaf node. Leaves have no add/remove capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafId(NodeId);

/// Handle to a branch node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchId(NodeId);

impl LeafId {
    pub fn node(self) -> NodeId {
        self.0
    }

    pub(crate) fn from_node(id: NodeId) -> Self {
        Self(id)
    }
}

impl BranchId {
    pub fn node(self) -> NodeId {
        self.0
    }

    pub(crate) fn from_node(id: NodeId) -> Self {
        Self(id)
    }
}

impl From<LeafId> for NodeId {
    fn from(id: LeafId) -> Self {
        id.0
    }
}

impl From<BranchId> for NodeId {
    fn from(id: BranchId) -> Self {
        id.0
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leaf {}", self.0)
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch {}", self.0)
    }
}

/// The closed set of node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<T> {
    /// Terminal node owning an immutable payload.
    Leaf(T),
    /// Ordered, exclusively owned children.
    Branch(Vec<NodeId>),
}

/// Tree node in the arena.
#[derive(Debug)]
pub struct TreeNode<T> {
    kind: NodeKind<T>,
    /// Owning branch, None for detached roots
    parent: Option<NodeId>,
}

impl<T> TreeNode<T> {
    pub fn kind(&self) -> &NodeKind<T> {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match &self.kind {
            NodeKind::Leaf(payload) => Some(payload),
            NodeKind::Branch(_) => None,
        }
    }

    /// Children in insertion order; always empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Branch(children) => children,
        }
    }
}

/// Arena-backed composite tree.
///
/// One arena may hold several independent trees: every node without a
/// parent is the root of its own tree. Nodes are created detached and
/// linked with [`TreeArena::add`]; a branch owns its children exclusively,
/// so the structure is always a forest, never a DAG.
#[derive(Debug)]
pub struct TreeArena<T> {
    arena: Arena<TreeNode<T>>,
    policy: TreePolicy,
}

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self::with_policy(TreePolicy::default())
    }

    pub fn with_policy(policy: TreePolicy) -> Self {
        Self {
            arena: Arena::new(),
            policy,
        }
    }

    pub fn policy(&self) -> TreePolicy {
        self.policy
    }

    #[instrument(level = "trace", skip_all)]
    pub fn new_leaf(&mut self, payload: T) -> LeafId {
        LeafId(self.insert(NodeKind::Leaf(payload)))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn new_branch(&mut self) -> BranchId {
        BranchId(self.insert(NodeKind::Branch(Vec::new())))
    }

    fn insert(&mut self, kind: NodeKind<T>) -> NodeId {
        NodeId(self.arena.insert(TreeNode { kind, parent: None }))
    }

    /// Appends `child` to the end of `branch`'s children.
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` if either handle is stale.
    /// * `CycleDetected` if `child` is `branch` itself, or (under
    ///   [`CyclePolicy::Reject`]) an ancestor of `branch`. Under
    ///   [`CyclePolicy::Unchecked`] an ancestor is linked as asked.
    /// * `AlreadyAttached` if `child` is owned by another branch.
    #[instrument(level = "debug", skip(self, child))]
    pub fn add(&mut self, branch: BranchId, child: impl Into<NodeId>) -> DomainResult<()> {
        let child = child.into();
        let branch_node = branch.node();

        self.node(branch_node)?;
        let child_parent = self.node(child)?.parent;

        if child == branch_node {
            return Err(DomainError::CycleDetected {
                branch: branch_node,
                child,
            });
        }
        if let Some(parent) = child_parent {
            return Err(DomainError::AlreadyAttached { child, parent });
        }
        if self.policy.cycle == CyclePolicy::Reject && self.is_ancestor(child, branch_node) {
            return Err(DomainError::CycleDetected {
                branch: branch_node,
                child,
            });
        }

        self.children_mut(branch)?.push(child);
        if let Some(node) = self.arena.get_mut(child.0) {
            node.parent = Some(branch_node);
        }
        debug!("linked {} under {}", child, branch_node);
        Ok(())
    }

    /// Removes `child` from `branch` by identity, keeping the relative
    /// order of the remaining children. The removed child becomes a
    /// detached root and may be added elsewhere.
    ///
    /// Returns whether a child was removed. An absent child is a no-op under
    /// [`RemovePolicy::Ignore`] and `ChildNotFound` under
    /// [`RemovePolicy::Strict`].
    #[instrument(level = "debug", skip(self, child))]
    pub fn remove(&mut self, branch: BranchId, child: impl Into<NodeId>) -> DomainResult<bool> {
        let child = child.into();
        let branch_node = branch.node();

        let children = self.children_mut(branch)?;
        match children.iter().position(|&c| c == child) {
            Some(pos) => {
                children.remove(pos);
                if let Some(node) = self.arena.get_mut(child.0) {
                    node.parent = None;
                }
                debug!("unlinked {} from {}", child, branch_node);
                Ok(true)
            }
            None => match self.policy.remove {
                RemovePolicy::Ignore => Ok(false),
                RemovePolicy::Strict => Err(DomainError::ChildNotFound {
                    branch: branch_node,
                    child,
                }),
            },
        }
    }

    /// Deletes a detached subtree from the arena, children first.
    ///
    /// Returns the number of nodes freed. Handles into the subtree are
    /// invalidated.
    #[instrument(level = "debug", skip(self, root))]
    pub fn prune(&mut self, root: impl Into<NodeId>) -> DomainResult<usize> {
        let root = root.into();
        if let Some(parent) = self.node(root)?.parent {
            return Err(DomainError::AlreadyAttached {
                child: root,
                parent,
            });
        }

        let doomed: Vec<NodeId> = self.iter_postorder(root).map(|(id, _)| id).collect();
        for id in &doomed {
            self.arena.remove(id.0);
        }
        debug!("pruned {} nodes below {}", doomed.len(), root);
        Ok(doomed.len())
    }

    fn children_mut(&mut self, branch: BranchId) -> DomainResult<&mut Vec<NodeId>> {
        match self.arena.get_mut(branch.0 .0).map(|node| &mut node.kind) {
            Some(NodeKind::Branch(children)) => Ok(children),
            _ => Err(DomainError::NodeNotFound(branch.node())),
        }
    }

    /// True if `candidate` is `node` or one of its ancestors.
    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.arena.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> DomainResult<&TreeNode<T>> {
        self.get(id).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn contains(&self, id: impl Into<NodeId>) -> bool {
        self.get(id.into()).is_some()
    }

    pub fn kind(&self, id: impl Into<NodeId>) -> DomainResult<&NodeKind<T>> {
        self.node(id.into()).map(TreeNode::kind)
    }

    pub fn payload(&self, leaf: LeafId) -> DomainResult<&T> {
        self.node(leaf.node())?
            .payload()
            .ok_or(DomainError::NodeNotFound(leaf.node()))
    }

    pub fn children(&self, branch: BranchId) -> DomainResult<&[NodeId]> {
        self.node(branch.node()).map(TreeNode::children)
    }

    pub fn parent(&self, id: impl Into<NodeId>) -> DomainResult<Option<NodeId>> {
        self.node(id.into()).map(TreeNode::parent)
    }

    /// Recovers a typed handle from an untyped one.
    pub fn as_leaf(&self, id: NodeId) -> Option<LeafId> {
        self.get(id).filter(|n| n.is_leaf()).map(|_| LeafId(id))
    }

    pub fn as_branch(&self, id: NodeId) -> Option<BranchId> {
        self.get(id).filter(|n| !n.is_leaf()).map(|_| BranchId(id))
    }

    /// Number of live nodes across all trees in the arena.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self, root: impl Into<NodeId>) -> PreOrderIterator<'_, T> {
        PreOrderIterator::new(self, root.into())
    }

    pub fn iter_postorder(&self, root: impl Into<NodeId>) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self, root.into())
    }

    pub fn subtree_len(&self, root: impl Into<NodeId>) -> usize {
        self.iter(root).count()
    }

    /// Number of levels below and including `root`; 0 for a stale handle.
    #[instrument(level = "debug", skip(self, root))]
    pub fn depth(&self, root: impl Into<NodeId>) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(root.into(), 1)];
        while let Some((id, depth)) = stack.pop() {
            if let Some(node) = self.get(id) {
                max_depth = max_depth.max(depth);
                stack.extend(node.children().iter().map(|&child| (child, depth + 1)));
            }
        }
        max_depth
    }

    /// Collects the payloads of all leaves below `root`, left to right.
    #[instrument(level = "debug", skip(self, root))]
    pub fn leaf_payloads(&self, root: impl Into<NodeId>) -> Vec<&T> {
        self.iter(root).filter_map(|(_, node)| node.payload()).collect()
    }
}

/// Depth-first, pre-order iterator with an explicit stack.
pub struct PreOrderIterator<'a, T> {
    tree: &'a TreeArena<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> PreOrderIterator<'a, T> {
    fn new(tree: &'a TreeArena<T>, root: NodeId) -> Self {
        Self {
            tree,
            stack: vec![root],
        }
    }
}

impl<'a, T> Iterator for PreOrderIterator<'a, T> {
    type Item = (NodeId, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children().iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    tree: &'a TreeArena<T>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(tree: &'a TreeArena<T>, root: NodeId) -> Self {
        Self {
            tree,
            stack: vec![(root, false)],
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (NodeId, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, expanded)) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                if expanded {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                for &child in node.children().iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
