//! Tri-axial ellipsoid.

use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};
use sk_math::{Frame, Line, Point3, Vector3};

use crate::quadric::{intersect_line_with_quadric, QuadricForm};
use crate::solid::{convex_line_query, Solid};
use crate::solver::{secular_root, SolverConfig};

/// An ellipsoid with semi-axis `a` along the frame's reference direction,
/// `b` along the orthogonal in-plane direction and `c` along the
/// revolution axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipsoid {
    frame: Frame,
    semi: [f64; 3],
    solver: SolverConfig,
}

impl Ellipsoid {
    pub fn new(origin: Point3, axis: Vector3, x_ref: Vector3, a: f64, b: f64, c: f64) -> Result<Self> {
        for (name, v) in [("a", a), ("b", b), ("c", c)] {
            if !(v > 0.0) || !v.is_finite() {
                return Err(GeomError::InvalidShape(format!(
                    "ellipsoid semi-axis {name} must be strictly positive, got {v}"
                )));
            }
        }
        Ok(Self {
            frame: Frame::new(origin, axis, x_ref)?,
            semi: [a, b, c],
            solver: SolverConfig::default(),
        })
    }

    /// Sphere as the degenerate equal-axes case.
    pub fn sphere(center: Point3, radius: f64) -> Result<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(GeomError::InvalidShape(format!(
                "sphere radius must be strictly positive, got {radius}"
            )));
        }
        Ok(Self {
            frame: Frame::axis_aligned(center),
            semi: [radius; 3],
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

    pub fn semi_axes(&self) -> (f64, f64, f64) {
        (self.semi[0], self.semi[1], self.semi[2])
    }

    fn form(&self) -> QuadricForm {
        let [a, b, c] = self.semi;
        QuadricForm::diagonal(1.0 / (a * a), 1.0 / (b * b), 1.0 / (c * c), -1.0)
    }

    /// Closest boundary point in local coordinates.
    ///
    /// Works in the first octant and restores the query's signs at the
    /// end, which also fixes the canonical representative for on-axis
    /// queries (which must be deterministic): zero components stay on the
    /// positive side of their axis.
    fn closest_boundary_local(&self, p: Point3) -> Result<Point3> {
        let sa = self.semi;
        let q = [p.x.abs(), p.y.abs(), p.z.abs()];
        let positive: Vec<usize> = (0..3).filter(|&i| q[i] > 0.0).collect();

        let x = match positive.len() {
            3 => {
                let t = secular_root(
                    &[(sa[0], q[0]), (sa[1], q[1]), (sa[2], q[2])],
                    &self.solver,
                )?;
                let mut x = [0.0; 3];
                for i in 0..3 {
                    x[i] = sa[i] * sa[i] * q[i] / (t + sa[i] * sa[i]);
                }
                x
            }
            2 => {
                let (i, j) = (positive[0], positive[1]);
                let k = 3 - i - j;
                let mut best = self.in_plane_candidate(i, j, &q)?;
                if let Some(cand) = off_plane_candidate(&sa, &q, i, j, k) {
                    if dist2(&cand, &q) < dist2(&best, &q) {
                        best = cand;
                    }
                }
                best
            }
            1 => {
                let k = positive[0];
                let u = q[k];
                let mut best = [0.0; 3];
                best[k] = sa[k]; // pole
                for j in (0..3).filter(|&j| j != k) {
                    let denom = sa[k] * sa[k] - sa[j] * sa[j];
                    if denom.abs() < 1e-15 {
                        continue;
                    }
                    let zk = sa[k] * sa[k] * u / denom;
                    let s = 1.0 - (zk / sa[k]) * (zk / sa[k]);
                    if s > 0.0 {
                        let mut cand = [0.0; 3];
                        cand[k] = zk;
                        cand[j] = sa[j] * s.sqrt();
                        if dist2(&cand, &q) < dist2(&best, &q) {
                            best = cand;
                        }
                    }
                }
                best
            }
            _ => {
                // Exact center: nearest boundary point lies on the
                // smallest semi-axis, ties resolved in axis order.
                let k = (0..3).fold(0, |m, i| if sa[i] < sa[m] { i } else { m });
                let mut x = [0.0; 3];
                x[k] = sa[k];
                x
            }
        };

        Ok(Point3::new(
            x[0].copysign(p.x),
            x[1].copysign(p.y),
            x[2].copysign(p.z),
        ))
    }

    /// Two-component secular solve in the plane spanned by axes `i`, `j`.
    fn in_plane_candidate(&self, i: usize, j: usize, q: &[f64; 3]) -> Result<[f64; 3]> {
        let sa = self.semi;
        let t = secular_root(&[(sa[i], q[i]), (sa[j], q[j])], &self.solver)?;
        let mut x = [0.0; 3];
        x[i] = sa[i] * sa[i] * q[i] / (t + sa[i] * sa[i]);
        x[j] = sa[j] * sa[j] * q[j] / (t + sa[j] * sa[j]);
        Ok(x)
    }
}

fn dist2(x: &[f64; 3], q: &[f64; 3]) -> f64 {
    (0..3).map(|i| (x[i] - q[i]) * (x[i] - q[i])).sum()
}

/// Candidate leaving the `x_k = 0` symmetry plane (Lagrange multiplier
/// pinned to the `k` axis), present only when it lands on the ellipsoid.
fn off_plane_candidate(
    sa: &[f64; 3],
    q: &[f64; 3],
    i: usize,
    j: usize,
    k: usize,
) -> Option<[f64; 3]> {
    let di = sa[i] * sa[i] - sa[k] * sa[k];
    let dj = sa[j] * sa[j] - sa[k] * sa[k];
    if di.abs() < 1e-15 || dj.abs() < 1e-15 {
        return None;
    }
    let xi = sa[i] * sa[i] * q[i] / di;
    let xj = sa[j] * sa[j] * q[j] / dj;
    let s = 1.0 - (xi / sa[i]) * (xi / sa[i]) - (xj / sa[j]) * (xj / sa[j]);
    if s <= 0.0 {
        return None;
    }
    let mut x = [0.0; 3];
    x[i] = xi;
    x[j] = xj;
    x[k] = sa[k] * s.sqrt();
    Some(x)
}

impl Solid for Ellipsoid {
    fn intersections(&self, line: &Line) -> Vec<Point3> {
        intersect_line_with_quadric(&self.form(), &self.frame, line, |_| true)
    }

    fn closest_point_to_point(&self, p: Point3) -> Result<Point3> {
        let local = self.frame.to_local_point(p);
        let x = self.closest_boundary_local(local)?;
        Ok(self.frame.to_standard_point(x))
    }

    fn contains_point(&self, p: Point3) -> bool {
        self.form().evaluate(self.frame.to_local_point(p)) <= 1e-12
    }

    fn closest_points_to_line(&self, line: &Line) -> Result<(Point3, Point3)> {
        let span = self.semi.iter().cloned().fold(0.0, f64::max);
        convex_line_query(self, line, self.frame.origin(), span, &self.solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_math::dvec3;

    fn reference_ellipsoid() -> Ellipsoid {
        Ellipsoid::new(Point3::ZERO, Vector3::Z, Vector3::X, 2.0, 1.5, 1.0).unwrap()
    }

    #[test]
    fn test_invalid_semi_axes_rejected() {
        assert!(Ellipsoid::new(Point3::ZERO, Vector3::Z, Vector3::X, 0.0, 1.0, 1.0).is_err());
        assert!(Ellipsoid::new(Point3::ZERO, Vector3::Z, Vector3::X, 1.0, -2.0, 1.0).is_err());
        assert!(Ellipsoid::new(Point3::ZERO, Vector3::Z, Vector3::Z, 1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_closest_point_on_x_axis() {
        let e = reference_ellipsoid();
        let p = e.closest_point_to_point(dvec3(5.0, 0.0, 0.0)).unwrap();
        assert!((p - dvec3(2.0, 0.0, 0.0)).length() < 1e-10);
        assert!((e.distance_to_point(dvec3(5.0, 0.0, 0.0)).unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_generic_closest_point_is_on_surface() {
        let e = reference_ellipsoid();
        let q = dvec3(3.0, 2.0, 1.5);
        let p = e.closest_point_to_point(q).unwrap();
        let l = e.frame().to_local_point(p);
        let res = (l.x / 2.0).powi(2) + (l.y / 1.5).powi(2) + l.z.powi(2) - 1.0;
        assert!(res.abs() < 1e-9, "closest point off surface: {res}");
    }

    #[test]
    fn test_interior_point_distance_zero_but_projection_on_surface() {
        let e = reference_ellipsoid();
        let q = dvec3(0.3, 0.1, -0.2);
        assert_eq!(e.distance_to_point(q).unwrap(), 0.0);
        let p = e.closest_point_to_point(q).unwrap();
        let l = e.frame().to_local_point(p);
        let res = (l.x / 2.0).powi(2) + (l.y / 1.5).powi(2) + l.z.powi(2) - 1.0;
        assert!(res.abs() < 1e-9);
    }

    #[test]
    fn test_center_query_canonical() {
        let e = reference_ellipsoid();
        // Smallest semi-axis is c = 1 along local z.
        let p = e.closest_point_to_point(Point3::ZERO).unwrap();
        assert!((p - dvec3(0.0, 0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_line_intersections_through_center() {
        let e = reference_ellipsoid();
        let line = Line::new(dvec3(-10.0, 0.0, 0.0), Vector3::X).unwrap();
        let pts = e.intersections(&line);
        assert_eq!(pts.len(), 2);
        assert!((pts[0] - dvec3(-2.0, 0.0, 0.0)).length() < 1e-10);
        assert!((pts[1] - dvec3(2.0, 0.0, 0.0)).length() < 1e-10);
        assert!(e.intersects(&line));
        assert_eq!(e.distance_to_line(&line).unwrap(), 0.0);
    }

    #[test]
    fn test_tangent_line_single_point() {
        let s = Ellipsoid::sphere(Point3::ZERO, 1.0).unwrap();
        let line = Line::new(dvec3(-5.0, 1.0, 0.0), Vector3::X).unwrap();
        let pts = s.intersections(&line);
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - dvec3(0.0, 1.0, 0.0)).length() < 1e-7);
        assert!(s.distance_to_line(&line).unwrap() < 1e-7);
    }

    #[test]
    fn test_missing_line_distance() {
        let s = Ellipsoid::sphere(Point3::ZERO, 1.0).unwrap();
        let line = Line::new(dvec3(-10.0, 3.0, 0.0), Vector3::X).unwrap();
        let (on_shape, on_line) = s.closest_points_to_line(&line).unwrap();
        assert!((on_shape - dvec3(0.0, 1.0, 0.0)).length() < 1e-5);
        assert!((on_line - dvec3(0.0, 3.0, 0.0)).length() < 1e-5);
        assert!((s.distance_to_line(&line).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotated_frame_round_trip() {
        let e = Ellipsoid::new(
            dvec3(1.0, 2.0, 3.0),
            dvec3(1.0, 1.0, 0.0),
            dvec3(0.0, 0.0, 1.0),
            2.0,
            1.5,
            1.0,
        )
        .unwrap();
        // Query along the local reference direction, 5 units out.
        let q = e.frame().to_standard_point(dvec3(5.0, 0.0, 0.0));
        let p = e.closest_point_to_point(q).unwrap();
        let expect = e.frame().to_standard_point(dvec3(2.0, 0.0, 0.0));
        assert!((p - expect).length() < 1e-9);
    }

    #[test]
    fn test_too_tight_threshold_surfaces_convergence_error() {
        let e = reference_ellipsoid().with_solver(SolverConfig::new(1e-40, 40));
        let err = e.closest_point_to_point(dvec3(3.0, 2.0, 1.5)).unwrap_err();
        assert!(matches!(err, GeomError::Convergence { .. }));
    }
}
