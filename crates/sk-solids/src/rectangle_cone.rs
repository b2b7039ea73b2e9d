//! Infinite pyramidal cone with rectangular cross-section.

use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};
use sk_math::{Frame, Line, Point3, Vector3};

use crate::solid::{convex_line_query, Solid};
use crate::solver::SolverConfig;

const DOMAIN_TOL: f64 = 1e-12;

/// Solid region `|x| <= z tan(alpha)`, `|y| <= z tan(beta)`, `z >= 0` in
/// the local frame: four planar faces meeting at the apex, with four
/// edge rays between them.
///
/// Unlike the quadric cones, every query here is closed-form: a face
/// projection, an edge-ray projection, or the apex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfiniteRectangleCone {
    frame: Frame,
    tan_a: f64,
    tan_b: f64,
    solver: SolverConfig,
}

impl InfiniteRectangleCone {
    pub fn new(apex: Point3, axis: Vector3, x_ref: Vector3, alpha: f64, beta: f64) -> Result<Self> {
        for (name, v) in [("alpha", alpha), ("beta", beta)] {
            if !v.is_finite() || v <= 0.0 || v >= std::f64::consts::FRAC_PI_2 {
                return Err(GeomError::InvalidShape(format!(
                    "pyramid half-angle {name} must lie in (0, pi/2), got {v}"
                )));
            }
        }
        Ok(Self {
            frame: Frame::new(apex, axis, x_ref)?,
            tan_a: alpha.tan(),
            tan_b: beta.tan(),
            solver: SolverConfig::default(),
        })
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn apex(&self) -> Point3 {
        self.frame.origin()
    }

    pub fn half_angles(&self) -> (f64, f64) {
        (self.tan_a.atan(), self.tan_b.atan())
    }

    /// Outward (non-unit) face normals, fixed iteration order.
    fn face_normals(&self) -> [Vector3; 4] {
        [
            Vector3::new(1.0, 0.0, -self.tan_a),
            Vector3::new(-1.0, 0.0, -self.tan_a),
            Vector3::new(0.0, 1.0, -self.tan_b),
            Vector3::new(0.0, -1.0, -self.tan_b),
        ]
    }

    /// Edge ray directions (non-unit), from the apex outward.
    fn edge_directions(&self) -> [Vector3; 4] {
        [
            Vector3::new(self.tan_a, self.tan_b, 1.0),
            Vector3::new(self.tan_a, -self.tan_b, 1.0),
            Vector3::new(-self.tan_a, self.tan_b, 1.0),
            Vector3::new(-self.tan_a, -self.tan_b, 1.0),
        ]
    }

    fn on_face(&self, i: usize, p: Point3) -> bool {
        if p.z < -DOMAIN_TOL {
            return false;
        }
        match i {
            0 | 1 => p.y.abs() <= p.z * self.tan_b + DOMAIN_TOL,
            _ => p.x.abs() <= p.z * self.tan_a + DOMAIN_TOL,
        }
    }

    fn contains_local(&self, p: Point3) -> bool {
        p.z >= -DOMAIN_TOL
            && p.x.abs() <= p.z * self.tan_a + DOMAIN_TOL
            && p.y.abs() <= p.z * self.tan_b + DOMAIN_TOL
    }
}

impl Solid for InfiniteRectangleCone {
    fn intersections(&self, line: &Line) -> Vec<Point3> {
        let o = self.frame.to_local_point(line.origin());
        let d = self.frame.to_local_vector(line.direction());

        let mut pts: Vec<Point3> = Vec::new();
        for (i, n) in self.face_normals().into_iter().enumerate() {
            let denom = d.dot(n);
            if denom.abs() < 1e-14 {
                continue;
            }
            let t = -o.dot(n) / denom;
            let p = o + t * d;
            if self.on_face(i, p) {
                let std = self.frame.to_standard_point(p);
                if pts.iter().all(|q| (*q - std).length() > 1e-9) {
                    pts.push(std);
                }
            }
        }
        pts.sort_by(|p, q| {
            line.abscissa(*p)
                .partial_cmp(&line.abscissa(*q))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pts
    }

    fn closest_point_to_point(&self, p: Point3) -> Result<Point3> {
        let l = self.frame.to_local_point(p);

        let mut best = Point3::ZERO; // apex
        let mut best_d = l.length_squared();

        for (i, n) in self.face_normals().into_iter().enumerate() {
            let n = n.normalize();
            let proj = l - l.dot(n) * n;
            if self.on_face(i, proj) {
                let d = (proj - l).length_squared();
                if d < best_d {
                    best_d = d;
                    best = proj;
                }
            }
        }

        for e in self.edge_directions() {
            let s = (l.dot(e) / e.length_squared()).max(0.0);
            let q = s * e;
            let d = (q - l).length_squared();
            if d < best_d {
                best_d = d;
                best = q;
            }
        }

        Ok(self.frame.to_standard_point(best))
    }

    fn contains_point(&self, p: Point3) -> bool {
        self.contains_local(self.frame.to_local_point(p))
    }

    fn closest_points_to_line(&self, line: &Line) -> Result<(Point3, Point3)> {
        let span = self.tan_a.max(self.tan_b).max(1.0);
        convex_line_query(self, line, self.apex(), span, &self.solver)
    }
}
