//! Quadric solids: ellipsoids, cylinders, and cones with line
//! intersection and closest-point queries.

pub mod cone;
pub mod cylinder;
pub mod ellipse;
pub mod ellipsoid;
pub mod quadric;
pub mod rectangle_cone;
pub mod solid;
pub mod solver;

pub use cone::{EllipticCone, InfiniteEllipticCone, InfiniteRightCircularCone, RightCircularCone};
pub use cylinder::{
    EllipticCylinder, InfiniteEllipticCylinder, InfiniteRightCircularCylinder,
    RightCircularCylinder,
};
pub use ellipsoid::Ellipsoid;
pub use rectangle_cone::InfiniteRectangleCone;
pub use solid::Solid;
pub use solver::SolverConfig;
