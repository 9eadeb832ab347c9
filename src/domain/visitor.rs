//! Double dispatch over the closed node variant set.
//!
//! A [`Visitor`] supplies one operation per variant. [`NodeView::accept`]
//! matches on the node's runtime variant and calls the matching operation,
//! so new operations are new `Visitor` impls and never touch the tree.

use crate::domain::arena::{BranchId, LeafId, NodeId, NodeKind, TreeArena, TreeNode};
use crate::domain::error::DomainResult;

/// One handling operation per node variant.
///
/// Side-effecting visitors use `Output = ()`; reducers return a value per
/// node or keep accumulation state on `self`.
pub trait Visitor<T> {
    type Output;

    fn visit_leaf(&mut self, leaf: LeafView<'_, T>) -> Self::Output;

    /// Called for branches. When driven by [`NodeView::accept`] alone the
    /// visitor decides whether to recurse via [`BranchView::children`];
    /// the traversal driver descends on its own.
    fn visit_branch(&mut self, branch: BranchView<'_, T>) -> Self::Output;
}

/// Borrowed view of any node, able to accept a visitor.
pub struct NodeView<'a, T> {
    tree: &'a TreeArena<T>,
    id: NodeId,
    node: &'a TreeNode<T>,
}

/// Borrowed view of a leaf.
pub struct LeafView<'a, T> {
    id: LeafId,
    payload: &'a T,
    parent: Option<NodeId>,
}

/// Borrowed view of a branch and its children.
pub struct BranchView<'a, T> {
    tree: &'a TreeArena<T>,
    id: BranchId,
    children: &'a [NodeId],
    parent: Option<NodeId>,
}

// Views only hold references, so they are Copy regardless of T.
impl<T> Clone for NodeView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for NodeView<'_, T> {}

impl<T> Clone for LeafView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for LeafView<'_, T> {}

impl<T> Clone for BranchView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for BranchView<'_, T> {}

impl<'a, T> NodeView<'a, T> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &'a TreeNode<T> {
        self.node
    }

    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    pub fn accept<V>(&self, visitor: &mut V) -> V::Output
    where
        V: Visitor<T> + ?Sized,
    {
        match self.node.kind() {
            NodeKind::Leaf(payload) => visitor.visit_leaf(LeafView {
                // The variant was just matched, so the typed handle is sound.
                id: LeafId::from_node(self.id),
                payload,
                parent: self.node.parent(),
            }),
            NodeKind::Branch(children) => visitor.visit_branch(BranchView {
                tree: self.tree,
                id: BranchId::from_node(self.id),
                children,
                parent: self.node.parent(),
            }),
        }
    }
}

impl<'a, T> LeafView<'a, T> {
    pub fn id(&self) -> LeafId {
        self.id
    }

    pub fn payload(&self) -> &'a T {
        self.payload
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl<'a, T> BranchView<'a, T> {
    pub fn id(&self) -> BranchId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child_ids(&self) -> &'a [NodeId] {
        self.children
    }

    /// Children in insertion order, ready for visitor-driven recursion.
    pub fn children(&self) -> impl Iterator<Item = NodeView<'a, T>> + 'a {
        let tree = self.tree;
        self.children.iter().filter_map(move |&id| tree.view(id).ok())
    }
}

impl<T> TreeArena<T> {
    pub fn view(&self, id: impl Into<NodeId>) -> DomainResult<NodeView<'_, T>> {
        let id = id.into();
        let node = self.node(id)?;
        Ok(NodeView {
            tree: self,
            id,
            node,
        })
    }

    /// Dispatches `visitor` on the node's runtime variant (no descent).
    pub fn accept<V>(&self, id: impl Into<NodeId>, visitor: &mut V) -> DomainResult<V::Output>
    where
        V: Visitor<T> + ?Sized,
    {
        Ok(self.view(id)?.accept(visitor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Recurses by itself from `visit_branch`, counting nodes.
    struct Counter;

    impl<T> Visitor<T> for Counter {
        type Output = usize;

        fn visit_leaf(&mut self, _leaf: LeafView<'_, T>) -> usize {
            1
        }

        fn visit_branch(&mut self, branch: BranchView<'_, T>) -> usize {
            1 + branch.children().map(|c| c.accept(self)).sum::<usize>()
        }
    }

    struct Labels(Vec<String>);

    impl Visitor<i32> for Labels {
        type Output = ();

        fn visit_leaf(&mut self, leaf: LeafView<'_, i32>) {
            self.0.push(format!("leaf:{}", leaf.payload()));
        }

        fn visit_branch(&mut self, branch: BranchView<'_, i32>) {
            self.0.push(format!("branch:{}", branch.len()));
        }
    }

    #[rstest]
    fn given_leaf_and_branch_when_accepting_then_runtime_variant_selects_operation() {
        let mut tree = TreeArena::new();
        let leaf = tree.new_leaf(7);
        let branch = tree.new_branch();
        let mut labels = Labels(Vec::new());

        // Both calls go through the untyped handle.
        tree.accept(leaf.node(), &mut labels).unwrap();
        tree.accept(branch.node(), &mut labels).unwrap();

        assert_eq!(labels.0, vec!["leaf:7", "branch:0"]);
    }

    #[rstest]
    fn given_visitor_recursing_itself_when_accepting_root_then_counts_whole_tree() {
        let mut tree = TreeArena::new();
        let root = tree.new_branch();
        let inner = tree.new_branch();
        for payload in 0..3 {
            let leaf = tree.new_leaf(payload);
            tree.add(inner, leaf).unwrap();
        }
        let last = tree.new_leaf(3);
        tree.add(root, inner).unwrap();
        tree.add(root, last).unwrap();

        assert_eq!(tree.accept(root, &mut Counter).unwrap(), 6);
        assert_eq!(tree.accept(last, &mut Counter).unwrap(), 1);
    }

    #[rstest]
    fn given_leaf_view_then_parent_and_payload_exposed() {
        let mut tree = TreeArena::new();
        let root = tree.new_branch();
        let leaf = tree.new_leaf(42);
        tree.add(root, leaf).unwrap();

        struct Probe(Option<(i32, Option<NodeId>)>);
        impl Visitor<i32> for Probe {
            type Output = ();
            fn visit_leaf(&mut self, leaf: LeafView<'_, i32>) {
                self.0 = Some((*leaf.payload(), leaf.parent()));
            }
            fn visit_branch(&mut self, _branch: BranchView<'_, i32>) {}
        }

        let mut probe = Probe(None);
        tree.accept(leaf, &mut probe).unwrap();
        assert_eq!(probe.0, Some((42, Some(root.node()))));
    }
}
