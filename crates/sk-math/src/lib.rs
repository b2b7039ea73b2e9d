pub mod accurate;
pub mod frame;
pub mod line;
pub mod plane;
pub mod rotation;

pub use glam::{dvec2, dvec3, DMat3, DMat4, DQuat, DVec2, DVec3, DVec4, EulerRot};

pub use frame::Frame;
pub use line::Line;
pub use plane::Plane;
pub use rotation::Rotation;

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
