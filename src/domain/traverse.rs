//! Pre-order, depth-first traversal driver.
//!
//! The driver owns recursion: each node is dispatched to the visitor before
//! its children, and children are descended left to right in insertion
//! order. Recursion uses an explicit stack, so tree depth is bounded by heap
//! rather than by the call stack.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeId, NodeKind, TreeArena};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::visitor::Visitor;

/// Traversal options. `Traversal::default()` is unbounded and uncancellable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Traversal<'f> {
    max_depth: Option<usize>,
    cancel: Option<&'f AtomicBool>,
}

impl<'f> Traversal<'f> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `DepthExceeded` instead of visiting below `limit` levels
    /// (the root is level 1).
    pub fn max_depth(mut self, limit: Option<usize>) -> Self {
        self.max_depth = limit;
        self
    }

    /// Checked before every node; once set the traversal stops with
    /// `Cancelled`.
    pub fn cancel_flag(mut self, flag: &'f AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Visits `root` and every descendant in pre-order.
    ///
    /// Returns the visitor outputs in visitation order. Termination relies
    /// on the tree being acyclic. `TreeArena::add` guarantees that under
    /// `CyclePolicy::Reject`; under `Unchecked` set `max_depth` or a cancel
    /// flag to bound the walk.
    #[instrument(level = "debug", skip_all)]
    pub fn run<T, V>(
        &self,
        tree: &TreeArena<T>,
        root: impl Into<NodeId>,
        visitor: &mut V,
    ) -> DomainResult<Vec<V::Output>>
    where
        V: Visitor<T> + ?Sized,
    {
        let root = root.into();
        tree.node(root)?;
        debug!("traversing from {}", root);

        let mut outputs = Vec::new();
        let mut stack = vec![(root, 1usize)];

        while let Some((id, depth)) = stack.pop() {
            if self.is_cancelled() {
                debug!("cancelled after {} nodes", outputs.len());
                return Err(DomainError::Cancelled {
                    visited: outputs.len(),
                });
            }
            if let Some(limit) = self.max_depth {
                if depth > limit {
                    return Err(DomainError::DepthExceeded { limit });
                }
            }

            let view = tree.view(id)?;
            trace!("visiting {} at depth {}", id, depth);
            outputs.push(view.accept(visitor));

            if let NodeKind::Branch(children) = view.node().kind() {
                // Reverse push keeps siblings left-to-right
                stack.extend(children.iter().rev().map(|&child| (child, depth + 1)));
            }
        }

        Ok(outputs)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

/// Pre-order traversal with default options.
pub fn traverse<T, V>(
    tree: &TreeArena<T>,
    root: impl Into<NodeId>,
    visitor: &mut V,
) -> DomainResult<Vec<V::Output>>
where
    V: Visitor<T> + ?Sized,
{
    Traversal::default().run(tree, root, visitor)
}

/// Dispatches only on `root`, leaving descent to the visitor's
/// `visit_branch`.
pub fn walk_recursive<T, V>(
    tree: &TreeArena<T>,
    root: impl Into<NodeId>,
    visitor: &mut V,
) -> DomainResult<V::Output>
where
    V: Visitor<T> + ?Sized,
{
    tree.accept(root, visitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::visitor::{BranchView, LeafView};
    use crate::domain::BranchId;
    use rstest::rstest;

    struct Ids;

    impl Visitor<char> for Ids {
        type Output = NodeId;

        fn visit_leaf(&mut self, leaf: LeafView<'_, char>) -> NodeId {
            leaf.id().node()
        }

        fn visit_branch(&mut self, branch: BranchView<'_, char>) -> NodeId {
            branch.id().node()
        }
    }

    /// A chain of `levels` nested branches ending in one leaf, built
    /// bottom-up so every cycle check starts from a fresh root.
    fn chain(levels: usize) -> (TreeArena<char>, BranchId) {
        let mut tree = TreeArena::new();
        let mut top = tree.new_leaf('x').node();
        let mut root = tree.new_branch();
        tree.add(root, top).unwrap();
        for _ in 1..levels {
            top = root.node();
            root = tree.new_branch();
            tree.add(root, top).unwrap();
        }
        (tree, root)
    }

    #[rstest]
    fn given_stale_root_when_traversing_then_node_not_found() {
        let mut tree = TreeArena::new();
        let leaf = tree.new_leaf('a');
        tree.prune(leaf).unwrap();
        assert_eq!(
            traverse(&tree, leaf, &mut Ids),
            Err(DomainError::NodeNotFound(leaf.node()))
        );
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(4), true)]
    #[case(Some(3), false)]
    fn given_depth_limit_when_traversing_then_enforced(
        #[case] limit: Option<usize>,
        #[case] ok: bool,
    ) {
        // 3 branches + 1 leaf = 4 levels
        let (tree, root) = chain(3);
        let result = Traversal::new().max_depth(limit).run(&tree, root, &mut Ids);
        assert_eq!(result.is_ok(), ok, "{:?}", result);
        if !ok {
            assert_eq!(result, Err(DomainError::DepthExceeded { limit: 3 }));
        }
    }

    #[rstest]
    fn given_deep_chain_when_traversing_then_no_stack_overflow() {
        let (tree, root) = chain(100_000);
        let visited = traverse(&tree, root, &mut Ids).unwrap();
        assert_eq!(visited.len(), 100_001);
    }

    #[rstest]
    fn given_raised_flag_when_traversing_then_cancelled_before_first_visit() {
        let (tree, root) = chain(2);
        let flag = AtomicBool::new(true);
        let result = Traversal::new().cancel_flag(&flag).run(&tree, root, &mut Ids);
        assert_eq!(result, Err(DomainError::Cancelled { visited: 0 }));
    }

    #[rstest]
    fn given_flag_raised_by_visitor_when_traversing_then_stops_midway() {
        struct StopAfter<'a> {
            seen: usize,
            limit: usize,
            flag: &'a AtomicBool,
        }
        impl Visitor<char> for StopAfter<'_> {
            type Output = ();
            fn visit_leaf(&mut self, _leaf: LeafView<'_, char>) {
                self.tick();
            }
            fn visit_branch(&mut self, _branch: BranchView<'_, char>) {
                self.tick();
            }
        }
        impl StopAfter<'_> {
            fn tick(&mut self) {
                self.seen += 1;
                if self.seen == self.limit {
                    self.flag.store(true, Ordering::Relaxed);
                }
            }
        }

        let (tree, root) = chain(5);
        let flag = AtomicBool::new(false);
        let mut visitor = StopAfter {
            seen: 0,
            limit: 2,
            flag: &flag,
        };
        let result = Traversal::new().cancel_flag(&flag).run(&tree, root, &mut visitor);
        assert_eq!(result, Err(DomainError::Cancelled { visited: 2 }));
    }
}
