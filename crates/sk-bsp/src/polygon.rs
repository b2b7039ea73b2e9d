//! Planar polygons and plane splitting for BSP construction.

use serde::{Deserialize, Serialize};
use sk_math::{Plane, Point3};

/// Which side of a plane a polygon occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonSide {
    Front,
    Back,
    Coplanar,
    Spanning,
}

/// A convex or simple planar polygon with its supporting plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point3>,
    pub plane: Plane,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    pub fn side_of(&self, plane: &Plane, tol: f64) -> PolygonSide {
        let mut front = false;
        let mut back = false;
        for &v in &self.vertices {
            let d = plane.signed_distance(v);
            if d > tol {
                front = true;
            } else if d < -tol {
                back = true;
            }
        }
        match (front, back) {
            (true, true) => PolygonSide::Spanning,
            (true, false) => PolygonSide::Front,
            (false, true) => PolygonSide::Back,
            (false, false) => PolygonSide::Coplanar,
        }
    }

    /// Split against a plane into the front and back parts
    /// (Sutherland-Hodgman on both sides). Coplanar polygons yield
    /// neither part.
    pub fn split(&self, plane: &Plane, tol: f64) -> (Option<Polygon>, Option<Polygon>) {
        match self.side_of(plane, tol) {
            PolygonSide::Front => return (Some(self.clone()), None),
            PolygonSide::Back => return (None, Some(self.clone())),
            PolygonSide::Coplanar => return (None, None),
            PolygonSide::Spanning => {}
        }

        let n = self.vertices.len();
        let mut front = Vec::with_capacity(n + 1);
        let mut back = Vec::with_capacity(n + 1);
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let da = plane.signed_distance(a);
            let db = plane.signed_distance(b);

            if da >= -tol {
                front.push(a);
            }
            if da <= tol {
                back.push(a);
            }
            if (da > tol && db < -tol) || (da < -tol && db > tol) {
                let t = da / (da - db);
                let p = a + t * (b - a);
                front.push(p);
                back.push(p);
            }
        }

        let front = (front.len() >= 3).then(|| Polygon::new(front, self.plane));
        let back = (back.len() >= 3).then(|| Polygon::new(back, self.plane));
        (front, back)
    }
}
