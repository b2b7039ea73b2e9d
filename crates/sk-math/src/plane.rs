use crate::accurate::cross_accurate;
use crate::{Line, Point3, Vector3};
use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};

/// A plane in 3D space defined by a point and a unit normal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3,
    pub normal: Vector3,
}

impl Plane {
    pub fn new(origin: Point3, normal: Vector3) -> Result<Self> {
        if normal.length_squared() < 1e-24 {
            return Err(GeomError::Degenerate(
                "plane normal must be a non-zero vector".into(),
            ));
        }
        Ok(Self {
            origin,
            normal: normal.normalize(),
        })
    }

    /// Plane through three points, normal along `(b - a) x (c - a)`.
    pub fn from_points(a: Point3, b: Point3, c: Point3) -> Result<Self> {
        let n = cross_accurate(b - a, c - a);
        if n.length_squared() < 1e-24 {
            return Err(GeomError::Degenerate(format!(
                "collinear points do not define a plane: {a:?}, {b:?}, {c:?}"
            )));
        }
        Ok(Self {
            origin: a,
            normal: n.normalize(),
        })
    }

    pub fn xy() -> Self {
        Self {
            origin: Point3::ZERO,
            normal: Vector3::Z,
        }
    }

    pub fn xz() -> Self {
        Self {
            origin: Point3::ZERO,
            normal: Vector3::Y,
        }
    }

    pub fn yz() -> Self {
        Self {
            origin: Point3::ZERO,
            normal: Vector3::X,
        }
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, point: Point3) -> f64 {
        (point - self.origin).dot(self.normal)
    }

    /// Project a point onto this plane.
    pub fn project_point(&self, point: Point3) -> Point3 {
        point - self.normal * self.signed_distance(point)
    }

    /// Intersection with a line, `None` when the line is parallel to the
    /// plane (within the angular threshold `1e-14`).
    pub fn intersection_with_line(&self, line: &Line) -> Option<Point3> {
        let denom = line.direction().dot(self.normal);
        if denom.abs() < 1e-14 {
            return None;
        }
        let t = -self.signed_distance(line.origin()) / denom;
        Some(line.point_at(t))
    }

    /// Flip orientation, keeping the same point set.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }
}
