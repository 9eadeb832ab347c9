//! Composite trees with double-dispatch visitors.
//!
//! Build a tree bottom-up in a [`TreeArena`](domain::TreeArena), then hand a
//! [`Visitor`](domain::Visitor) to [`traverse`](domain::traverse) to visit
//! every node in pre-order:
//!
//! ```
//! use grove::application::NameCollector;
//! use grove::domain::{traverse, TreeArena};
//!
//! let mut tree = TreeArena::new();
//! let root = tree.new_branch();
//! let a = tree.new_leaf("A");
//! tree.add(root, a).unwrap();
//!
//! let mut names = NameCollector::new();
//! traverse(&tree, root, &mut names).unwrap();
//! assert_eq!(names.names(), ["A"]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
