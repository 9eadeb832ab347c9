//! Application layer: shapes, stock visitors and scene files
//!
//! This layer builds trees from host data and drives the domain engine.

pub mod error;
pub mod error_ext;
pub mod scene;
pub mod shapes;
pub mod visitors;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use scene::{BuiltScene, Scene, SceneNode};
pub use shapes::Shape;
pub use visitors::{AreaCalculator, AreaEntry, DrawVisitor, KindTagger, NameCollector, NodeTag, TreeRenderer};
