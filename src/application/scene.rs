//! Scene files: TOML descriptions of shape trees.
//!
//! ```toml
//! [root]
//! children = [
//!   { shape = "circle", radius = 5.0 },
//!   { children = [ { shape = "line", length = 2.0 } ] },
//! ]
//! ```
//!
//! A table with `children` is a group (branch); a table with `shape` is a
//! leaf. A table with both is rejected.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::error_ext::IoResultExt;
use crate::application::shapes::Shape;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainResult, NodeId, TreeArena, TreePolicy};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSceneNode")]
pub enum SceneNode {
    Group { children: Vec<SceneNode> },
    Shape(Shape),
}

/// A scene table before it is classified as group or shape.
#[derive(Deserialize)]
struct RawSceneNode {
    children: Option<Vec<SceneNode>>,
    #[serde(flatten)]
    rest: toml::Table,
}

impl TryFrom<RawSceneNode> for SceneNode {
    type Error = String;

    fn try_from(raw: RawSceneNode) -> Result<Self, Self::Error> {
        match raw.children {
            Some(children) if raw.rest.is_empty() => Ok(SceneNode::Group { children }),
            Some(_) => Err(format!(
                "group table takes only `children`, found `{}`",
                raw.rest.keys().map(String::as_str).collect::<Vec<_>>().join("`, `")
            )),
            None => Shape::deserialize(toml::Value::Table(raw.rest))
                .map(SceneNode::Shape)
                .map_err(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scene {
    pub root: SceneNode,
}

/// A scene materialised into an arena.
#[derive(Debug)]
pub struct BuiltScene {
    pub tree: TreeArena<Shape>,
    pub root: NodeId,
}

impl Scene {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse a scene file. `~` and `$VAR` in the path are expanded.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> ApplicationResult<Self> {
        let path = expand_path(path);
        if !path.exists() {
            return Err(ApplicationError::SceneNotFound(path));
        }
        let content = fs::read_to_string(&path).with_path_context("read scene", &path)?;
        Self::parse(&content).map_err(|e| ApplicationError::InvalidScene {
            path: path.clone(),
            message: e.to_string(),
        })
    }

    /// Builds the tree bottom-up: leaves first, then their groups.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self, policy: TreePolicy) -> ApplicationResult<BuiltScene> {
        let mut tree = TreeArena::with_policy(policy);
        let root = build_node(&mut tree, &self.root)?;
        debug!("built scene with {} nodes", tree.len());
        Ok(BuiltScene { tree, root })
    }
}

fn build_node(tree: &mut TreeArena<Shape>, node: &SceneNode) -> DomainResult<NodeId> {
    match node {
        SceneNode::Shape(shape) => Ok(tree.new_leaf(*shape).node()),
        SceneNode::Group { children } => {
            let ids = children
                .iter()
                .map(|child| build_node(tree, child))
                .collect::<DomainResult<Vec<_>>>()?;
            let branch = tree.new_branch();
            for id in ids {
                tree.add(branch, id)?;
            }
            Ok(branch.node())
        }
    }
}

/// Expand `~` and environment variables in a path, leaving it untouched on
/// lookup failure.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn given_mixed_tables_when_parsing_then_groups_and_shapes_distinguished() {
        let scene = Scene::parse(
            r#"
            [root]
            children = [
              { shape = "circle", radius = 5 },
              { children = [ { shape = "line", length = 2.5 } ] },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(
            scene.root,
            SceneNode::Group {
                children: vec![
                    SceneNode::Shape(Shape::Circle { radius: 5.0 }),
                    SceneNode::Group {
                        children: vec![SceneNode::Shape(Shape::Line { length: 2.5 })]
                    },
                ]
            }
        );
    }

    #[rstest]
    fn given_unknown_shape_when_parsing_then_error() {
        let result = Scene::parse(
            r#"
            [root]
            shape = "hexagon"
            side = 1.0
            "#,
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn given_table_with_shape_and_children_when_parsing_then_rejected() {
        let err = Scene::parse(
            r#"
            [root]
            children = [ { shape = "circle", radius = 1, children = [] } ]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("only `children`"), "{}", err);
        assert!(err.to_string().contains("shape"), "{}", err);
    }

    #[rstest]
    fn given_unknown_shape_deep_in_tree_when_parsing_then_names_the_shape() {
        let err = Scene::parse(
            r#"
            [root]
            children = [
              { shape = "circle", radius = 1 },
              { children = [ { shape = "hexagon", side = 1 } ] },
            ]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("hexagon"), "{}", err);
    }

    #[rstest]
    fn given_scene_when_building_then_children_keep_file_order() {
        let scene = Scene::parse(
            r#"
            [root]
            children = [
              { shape = "circle", radius = 1 },
              { shape = "rectangle", width = 2, height = 3 },
              { shape = "triangle", base = 4, height = 5 },
            ]
            "#,
        )
        .unwrap();
        let built = scene.build(TreePolicy::default()).unwrap();
        let names: Vec<&str> = built
            .tree
            .leaf_payloads(built.root)
            .into_iter()
            .map(Shape::name)
            .collect();
        assert_eq!(names, vec!["circle", "rectangle", "triangle"]);
        assert_eq!(built.tree.len(), 4);
    }
}
