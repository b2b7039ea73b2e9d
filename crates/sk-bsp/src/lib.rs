//! Polyhedral solid regions: boundary representation with structural
//! validation, and BSP-tree point classification.

pub mod brep;
pub mod polygon;
pub mod region;
pub mod tree;

pub use brep::Brep;
pub use polygon::Polygon;
pub use region::PolyhedronSet;
pub use tree::{BspTree, Location};
