//! Stock visitors: name collection, variant tagging, area sums, drawing
//! and tree rendering.

use std::fmt;

use termtree::Tree;
use tracing::{debug, info};

use crate::application::shapes::Shape;
use crate::domain::{BranchView, LeafView, Visitor};

/// Collects leaf payloads as strings in visitation order.
#[derive(Debug, Default)]
pub struct NameCollector {
    names: Vec<String>,
}

impl NameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

impl<T: fmt::Display> Visitor<T> for NameCollector {
    type Output = ();

    fn visit_leaf(&mut self, leaf: LeafView<'_, T>) {
        self.names.push(leaf.payload().to_string());
    }

    fn visit_branch(&mut self, _branch: BranchView<'_, T>) {}
}

/// Variant tag of a visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTag {
    Leaf,
    Branch,
}

impl NodeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeTag::Leaf => "leaf",
            NodeTag::Branch => "branch",
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns one tag per node, naming the variant dispatch selected.
#[derive(Debug, Default, Clone, Copy)]
pub struct KindTagger;

impl<T> Visitor<T> for KindTagger {
    type Output = NodeTag;

    fn visit_leaf(&mut self, _leaf: LeafView<'_, T>) -> NodeTag {
        NodeTag::Leaf
    }

    fn visit_branch(&mut self, _branch: BranchView<'_, T>) -> NodeTag {
        NodeTag::Branch
    }
}

/// Area of one visited shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaEntry {
    pub shape: Shape,
    pub area: f64,
}

/// Sums the areas of all shapes it visits.
#[derive(Debug)]
pub struct AreaCalculator {
    precision: usize,
    entries: Vec<AreaEntry>,
}

impl Default for AreaCalculator {
    fn default() -> Self {
        Self::new(2)
    }
}

impl AreaCalculator {
    /// `precision` is the number of decimals in report lines.
    pub fn new(precision: usize) -> Self {
        Self {
            precision,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[AreaEntry] {
        &self.entries
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.area).sum()
    }

    /// One line per shape, e.g. `Area of circle with radius 5: 78.54`.
    pub fn report(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("Area of {}: {:.*}", e.shape, self.precision, e.area))
            .collect()
    }

    pub fn total_line(&self) -> String {
        format!("Total area: {:.*}", self.precision, self.total())
    }
}

impl Visitor<Shape> for AreaCalculator {
    type Output = ();

    fn visit_leaf(&mut self, leaf: LeafView<'_, Shape>) {
        let shape = *leaf.payload();
        let area = shape.area();
        info!("area of {}: {:.*}", shape, self.precision, area);
        self.entries.push(AreaEntry { shape, area });
    }

    fn visit_branch(&mut self, branch: BranchView<'_, Shape>) {
        debug!("entering group with {} members", branch.len());
    }
}

/// Produces the draw line of each node; composites draw themselves before
/// their members when driven in pre-order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DrawVisitor;

impl Visitor<Shape> for DrawVisitor {
    type Output = String;

    fn visit_leaf(&mut self, leaf: LeafView<'_, Shape>) -> String {
        format!("Drawing a {}", leaf.payload().name())
    }

    fn visit_branch(&mut self, _branch: BranchView<'_, Shape>) -> String {
        "Drawing a composite graphic".to_string()
    }
}

/// Renders a subtree into a [`termtree::Tree`], recursing from
/// `visit_branch` itself.
#[derive(Debug, Clone)]
pub struct TreeRenderer {
    branch_label: String,
}

impl Default for TreeRenderer {
    fn default() -> Self {
        Self::new("composite")
    }
}

impl TreeRenderer {
    pub fn new(branch_label: impl Into<String>) -> Self {
        Self {
            branch_label: branch_label.into(),
        }
    }
}

impl<T: fmt::Display> Visitor<T> for TreeRenderer {
    type Output = Tree<String>;

    fn visit_leaf(&mut self, leaf: LeafView<'_, T>) -> Tree<String> {
        Tree::new(leaf.payload().to_string())
    }

    fn visit_branch(&mut self, branch: BranchView<'_, T>) -> Tree<String> {
        let label = format!("{} ({})", self.branch_label, branch.len());
        let leaves: Vec<_> = branch.children().map(|child| child.accept(self)).collect();
        Tree::new(label).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{traverse, walk_recursive, TreeArena};
    use rstest::rstest;

    #[rstest]
    fn given_nested_strings_when_rendering_then_tree_mirrors_structure() {
        let mut tree = TreeArena::new();
        let root = tree.new_branch();
        let a = tree.new_leaf("a");
        let inner = tree.new_branch();
        let b = tree.new_leaf("b");
        tree.add(inner, b).unwrap();
        tree.add(root, a).unwrap();
        tree.add(root, inner).unwrap();

        let rendered = walk_recursive(&tree, root, &mut TreeRenderer::default())
            .unwrap()
            .to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "composite (2)");
        assert!(lines[1].ends_with("a"));
        assert!(lines[2].ends_with("composite (1)"));
        assert!(lines[3].ends_with("b"));
    }

    #[rstest]
    fn given_shapes_when_calculating_area_then_report_uses_precision() {
        let mut tree = TreeArena::new();
        let root = tree.new_branch();
        let circle = tree.new_leaf(Shape::Circle { radius: 5.0 });
        tree.add(root, circle).unwrap();

        let mut calc = AreaCalculator::new(3);
        traverse(&tree, root, &mut calc).unwrap();
        assert_eq!(calc.report(), vec!["Area of circle with radius 5: 78.540"]);
        assert_eq!(calc.total_line(), "Total area: 78.540");
    }

    #[rstest]
    fn given_tags_then_display_lowercase() {
        assert_eq!(NodeTag::Leaf.to_string(), "leaf");
        assert_eq!(NodeTag::Branch.to_string(), "branch");
    }
}
