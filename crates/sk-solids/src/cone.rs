//! Elliptic and circular cones, finite and infinite (single nappe).

use sk_math::dvec2;
use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};
use sk_math::{Frame, Line, Point3, Vector3};

use crate::cylinder::delegate_solid;
use crate::ellipse::closest_point_on_ellipse;
use crate::quadric::{intersect_line_with_quadric, QuadricForm};
use crate::solid::{convex_line_query, Solid};
use crate::solver::SolverConfig;

const DOMAIN_TOL: f64 = 1e-12;

fn check_half_angle(name: &str, v: f64) -> Result<()> {
    if !v.is_finite() || v <= 0.0 || v >= std::f64::consts::FRAC_PI_2 {
        return Err(GeomError::InvalidShape(format!(
            "cone half-angle {name} must lie in (0, pi/2), got {v}"
        )));
    }
    Ok(())
}

/// One-nappe infinite cone with apex at the frame origin, opening along
/// the axis, with half-aperture `alpha` in the `u`-axis meridian plane
/// and `beta` in the `v`-axis one.
///
/// Local implicit equation: `(x/tan alpha)^2 + (y/tan beta)^2 = z^2`,
/// `z >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfiniteEllipticCone {
    frame: Frame,
    tan_a: f64,
    tan_b: f64,
    solver: SolverConfig,
}

impl InfiniteEllipticCone {
    pub fn new(apex: Point3, axis: Vector3, x_ref: Vector3, alpha: f64, beta: f64) -> Result<Self> {
        check_half_angle("alpha", alpha)?;
        check_half_angle("beta", beta)?;
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

    fn form(&self) -> QuadricForm {
        QuadricForm::diagonal(
            1.0 / (self.tan_a * self.tan_a),
            1.0 / (self.tan_b * self.tan_b),
            -1.0,
            0.0,
        )
    }

    fn contains_local(&self, p: Point3) -> bool {
        if p.z < -DOMAIN_TOL {
            return false;
        }
        let r = (p.x / self.tan_a) * (p.x / self.tan_a) + (p.y / self.tan_b) * (p.y / self.tan_b);
        r <= p.z * p.z * (1.0 + DOMAIN_TOL) + DOMAIN_TOL
    }

    /// Meridian angle of the lateral surface point nearest `p` (local),
    /// found by a sampled seed plus Newton polishing, together with the
    /// generator abscissa `s` of the unclamped projection.
    ///
    /// A generator is `s * g(theta)` with
    /// `g = (tan_a cos, tan_b sin, 1)`; the projection abscissa for a
    /// fixed meridian is `s = (p . g) / |g|^2`.
    fn meridian_solve(&self, p: Point3) -> Result<(f64, f64)> {
        let (ta, tb) = (self.tan_a, self.tan_b);
        let a_of = |th: f64| p.x * ta * th.cos() + p.y * tb * th.sin() + p.z;
        let b_of = |th: f64| {
            ta * ta * th.cos() * th.cos() + tb * tb * th.sin() * th.sin() + 1.0
        };

        // Degenerate on-axis query: every meridian is equivalent for the
        // circular cone; the canonical representative is theta = 0, and
        // for the elliptic cone the flatter-gradient meridian wins below.
        if p.x * p.x + p.y * p.y < 1e-28 {
            let theta = if tb < ta {
                std::f64::consts::FRAC_PI_2
            } else {
                0.0
            };
            return Ok((theta, a_of(theta) / b_of(theta)));
        }

        // Coarse scan for the best basin.
        const N: usize = 64;
        let mut theta = 0.0;
        let mut best = f64::NEG_INFINITY;
        for k in 0..N {
            let th = 2.0 * std::f64::consts::PI * (k as f64) / (N as f64);
            let a = a_of(th);
            if a <= 0.0 {
                continue;
            }
            let m = a * a / b_of(th);
            if m > best {
                best = m;
                theta = th;
            }
        }
        if best == f64::NEG_INFINITY {
            // The whole surface faces away: apex region.
            return Ok((0.0, -1.0));
        }

        // Newton iteration on d/dtheta of (p.g)^2 / |g|^2.
        let step_cap = 2.0 * std::f64::consts::PI / (N as f64);
        for _ in 0..self.solver.max_iterations {
            let (sin, cos) = theta.sin_cos();
            let a = p.x * ta * cos + p.y * tb * sin + p.z;
            let da = -p.x * ta * sin + p.y * tb * cos;
            let dda = -(a - p.z);
            let b = ta * ta * cos * cos + tb * tb * sin * sin + 1.0;
            let db = (tb * tb - ta * ta) * (2.0 * theta).sin();
            let ddb = 2.0 * (tb * tb - ta * ta) * (2.0 * theta).cos();
            let n = 2.0 * a * da * b - a * a * db;
            let dn = 2.0 * (da * da + a * dda) * b - a * a * ddb;
            let delta = if dn.abs() > 1e-300 {
                (-n / dn).clamp(-step_cap, step_cap)
            } else {
                0.0
            };
            theta += delta;
            if delta.abs() < self.solver.threshold {
                let a = a_of(theta);
                return Ok((theta, a / b_of(theta)));
            }
        }
        Err(GeomError::Convergence {
            threshold: self.solver.threshold,
            iterations: self.solver.max_iterations,
        })
    }

    fn generator_point(&self, theta: f64, s: f64) -> Point3 {
        Point3::new(
            s * self.tan_a * theta.cos(),
            s * self.tan_b * theta.sin(),
            s,
        )
    }
}

impl Solid for InfiniteEllipticCone {
    fn intersections(&self, line: &Line) -> Vec<Point3> {
        intersect_line_with_quadric(&self.form(), &self.frame, line, |p| p.z >= -DOMAIN_TOL)
    }

    fn closest_point_to_point(&self, p: Point3) -> Result<Point3> {
        let l = self.frame.to_local_point(p);
        let (theta, s) = self.meridian_solve(l)?;
        let local = if s <= 0.0 {
            Point3::ZERO // apex
        } else {
            self.generator_point(theta, s)
        };
        Ok(self.frame.to_standard_point(local))
    }

    fn contains_point(&self, p: Point3) -> bool {
        self.contains_local(self.frame.to_local_point(p))
    }

    fn closest_points_to_line(&self, line: &Line) -> Result<(Point3, Point3)> {
        let span = self.tan_a.max(self.tan_b).max(1.0);
        convex_line_query(self, line, self.apex(), span, &self.solver)
    }
}

/// Finite elliptic cone: apex at the frame origin, lateral surface up to
/// the elliptic base cap at `z = height`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EllipticCone {
    lateral: InfiniteEllipticCone,
    height: f64,
}

impl EllipticCone {
    pub fn new(
        apex: Point3,
        axis: Vector3,
        x_ref: Vector3,
        alpha: f64,
        beta: f64,
        height: f64,
    ) -> Result<Self> {
        if !(height > 0.0) || !height.is_finite() {
            return Err(GeomError::InvalidShape(format!(
                "cone height must be strictly positive, got {height}"
            )));
        }
        Ok(Self {
            lateral: InfiniteEllipticCone::new(apex, axis, x_ref, alpha, beta)?,
            height,
        })
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.lateral = self.lateral.with_solver(solver);
        self
    }

    pub fn frame(&self) -> &Frame {
        self.lateral.frame()
    }

    pub fn apex(&self) -> Point3 {
        self.lateral.apex()
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Base-cap ellipse semi-axes.
    pub fn base_semi_axes(&self) -> (f64, f64) {
        (self.height * self.lateral.tan_a, self.height * self.lateral.tan_b)
    }

    fn cap_section(&self, x: f64, y: f64) -> f64 {
        let (ea, eb) = self.base_semi_axes();
        (x / ea) * (x / ea) + (y / eb) * (y / eb)
    }
}

impl Solid for EllipticCone {
    fn intersections(&self, line: &Line) -> Vec<Point3> {
        let frame = self.frame();
        let h = self.height;
        let mut pts =
            intersect_line_with_quadric(&self.lateral.form(), frame, line, |p| {
                p.z >= -DOMAIN_TOL && p.z <= h + DOMAIN_TOL
            });

        let o = frame.to_local_point(line.origin());
        let d = frame.to_local_vector(line.direction());
        if d.z.abs() > 1e-14 {
            let t = (h - o.z) / d.z;
            let p = o + t * d;
            if self.cap_section(p.x, p.y) <= 1.0 + DOMAIN_TOL {
                let std = frame.to_standard_point(p);
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
        let frame = self.frame();
        let l = frame.to_local_point(p);
        let (theta, s) = self.lateral.meridian_solve(l)?;

        // Lateral candidate, clamped to the finite extent; the clamped
        // end coincides with the apex or the rim, both covered below.
        let mut best = self.lateral.generator_point(theta, s.clamp(0.0, self.height));
        let mut best_d = (best - l).length_squared();

        let mut consider = |cand: Point3| {
            let d = (cand - l).length_squared();
            if d < best_d {
                best_d = d;
                best = cand;
            }
        };

        consider(Point3::ZERO); // apex

        let (ea, eb) = self.base_semi_axes();
        let cap = if self.cap_section(l.x, l.y) <= 1.0 {
            Point3::new(l.x, l.y, self.height)
        } else {
            let e = closest_point_on_ellipse(ea, eb, dvec2(l.x, l.y), &self.lateral.solver)?;
            Point3::new(e.x, e.y, self.height)
        };
        consider(cap);

        Ok(frame.to_standard_point(best))
    }

    fn contains_point(&self, p: Point3) -> bool {
        let l = self.frame().to_local_point(p);
        l.z <= self.height + DOMAIN_TOL && self.lateral.contains_local(l)
    }

    fn closest_points_to_line(&self, line: &Line) -> Result<(Point3, Point3)> {
        let (ea, eb) = self.base_semi_axes();
        let span = ea.max(eb).max(self.height);
        convex_line_query(self, line, self.apex(), span, &self.lateral.solver)
    }
}

/// Infinite circular cone; only the axis and one half-angle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfiniteRightCircularCone {
    inner: InfiniteEllipticCone,
}

impl InfiniteRightCircularCone {
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64) -> Result<Self> {
        let frame = Frame::from_axis(apex, axis)?;
        Ok(Self {
            inner: InfiniteEllipticCone::new(apex, axis, frame.u(), half_angle, half_angle)?,
        })
    }

    pub fn half_angle(&self) -> f64 {
        self.inner.half_angles().0
    }

    pub fn apex(&self) -> Point3 {
        self.inner.apex()
    }
}

delegate_solid!(InfiniteRightCircularCone, inner);

/// Finite circular cone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightCircularCone {
    inner: EllipticCone,
}

impl RightCircularCone {
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64, height: f64) -> Result<Self> {
        let frame = Frame::from_axis(apex, axis)?;
        Ok(Self {
            inner: EllipticCone::new(apex, axis, frame.u(), half_angle, half_angle, height)?,
        })
    }

    pub fn half_angle(&self) -> f64 {
        self.inner.lateral.half_angles().0
    }

    pub fn height(&self) -> f64 {
        self.inner.height()
    }

    pub fn apex(&self) -> Point3 {
        self.inner.apex()
    }
}

delegate_solid!(RightCircularCone, inner);

#[cfg(test)]
mod tests {
    use super::*;
    use sk_math::dvec3;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_half_angle_range_enforced() {
        for bad in [0.0, -0.3, FRAC_PI_2, 2.0] {
            assert!(
                InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, bad, 0.5).is_err()
            );
        }
    }

    #[test]
    fn test_infinite_cone_intersections() {
        let cone =
            InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, FRAC_PI_4, FRAC_PI_4)
                .unwrap();
        let line = Line::new(dvec3(-10.0, 0.0, 5.0), Vector3::X).unwrap();
        let pts = cone.intersections(&line);
        assert_eq!(pts.len(), 2);
        assert!((pts[0] - dvec3(-5.0, 0.0, 5.0)).length() < 1e-10);
        assert!((pts[1] - dvec3(5.0, 0.0, 5.0)).length() < 1e-10);
    }

    #[test]
    fn test_opposite_nappe_filtered() {
        let cone =
            InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, FRAC_PI_4, FRAC_PI_4)
                .unwrap();
        let line = Line::new(dvec3(-10.0, 0.0, -5.0), Vector3::X).unwrap();
        assert!(cone.intersections(&line).is_empty());
        assert!(!cone.intersects(&line));
    }

    #[test]
    fn test_closest_point_beside_apex() {
        let cone =
            InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, FRAC_PI_4, FRAC_PI_4)
                .unwrap();
        let p = cone.closest_point_to_point(dvec3(2.0, 0.0, 0.0)).unwrap();
        assert!((p - dvec3(1.0, 0.0, 1.0)).length() < 1e-9);
        let d = cone.distance_to_point(dvec3(2.0, 0.0, 0.0)).unwrap();
        assert!((d - 2.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_point_below_apex_maps_to_apex() {
        let cone =
            InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, FRAC_PI_4, FRAC_PI_4)
                .unwrap();
        let p = cone.closest_point_to_point(dvec3(0.0, 0.0, -3.0)).unwrap();
        assert!((p - Point3::ZERO).length() < 1e-12);
        let d = cone.distance_to_point(dvec3(0.0, 0.0, -3.0)).unwrap();
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_apex_query_zero_distance() {
        let cone =
            InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, 0.3, 0.6).unwrap();
        assert_eq!(cone.distance_to_point(Point3::ZERO).unwrap(), 0.0);
        let p = cone.closest_point_to_point(Point3::ZERO).unwrap();
        assert!((p - Point3::ZERO).length() < 1e-12);
    }

    #[test]
    fn test_point_on_surface_is_fixed() {
        let cone =
            InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, FRAC_PI_4, FRAC_PI_4)
                .unwrap();
        let q = dvec3(3.0, 0.0, 3.0);
        assert!(cone.contains_point(q));
        let p = cone.closest_point_to_point(q).unwrap();
        assert!((p - q).length() < 1e-9);
    }

    #[test]
    fn test_interior_point_closest_on_lateral_surface() {
        let cone =
            InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, FRAC_PI_4, FRAC_PI_4)
                .unwrap();
        let q = dvec3(0.0, 0.0, 5.0);
        assert_eq!(cone.distance_to_point(q).unwrap(), 0.0);
        let p = cone.closest_point_to_point(q).unwrap();
        // Canonical meridian for an on-axis query is theta = 0.
        assert!(p.y.abs() < 1e-12);
        assert!(p.x > 0.0);
        // On the 45-degree surface: x = z.
        assert!((p.x - p.z).abs() < 1e-9);
    }

    #[test]
    fn test_elliptic_closest_point_on_surface_with_normal_offset() {
        let cone =
            InfiniteEllipticCone::new(Point3::ZERO, Vector3::Z, Vector3::X, 0.4, 0.7).unwrap();
        let q = dvec3(2.5, 1.5, 1.0);
        let p = cone.closest_point_to_point(q).unwrap();
        let (ta, tb) = (0.4f64.tan(), 0.7f64.tan());
        let res = (p.x / ta) * (p.x / ta) + (p.y / tb) * (p.y / tb) - p.z * p.z;
        assert!(res.abs() < 1e-7, "closest point off cone: {res}");
        // Offset orthogonal to both surface tangents at the closest point.
        let theta = (p.y / tb).atan2(p.x / ta);
        let t_theta = dvec3(-ta * theta.sin(), tb * theta.cos(), 0.0);
        let t_s = dvec3(ta * theta.cos(), tb * theta.sin(), 1.0);
        let d = q - p;
        assert!(d.dot(t_theta).abs() < 1e-7);
        assert!(d.dot(t_s).abs() < 1e-7);
    }

    #[test]
    fn test_finite_cone_height_filter_and_cap() {
        let cone = EllipticCone::new(
            Point3::ZERO,
            Vector3::Z,
            Vector3::X,
            FRAC_PI_4,
            FRAC_PI_4,
            4.0,
        )
        .unwrap();
        // Lateral surface at z = 5 is beyond the cap.
        let line = Line::new(dvec3(-10.0, 0.0, 5.0), Vector3::X).unwrap();
        assert!(cone.intersections(&line).is_empty());

        // Straight down through the cap and to the apex.
        let line = Line::new(dvec3(0.0, 0.0, 10.0), dvec3(0.0, 0.0, -1.0)).unwrap();
        let pts = cone.intersections(&line);
        assert_eq!(pts.len(), 2);
        assert!((pts[0] - dvec3(0.0, 0.0, 10.0)).length() > 0.0); // sorted by abscissa
        assert!(pts.iter().any(|p| (*p - dvec3(0.0, 0.0, 4.0)).length() < 1e-9));
        assert!(pts.iter().any(|p| (*p - Point3::ZERO).length() < 1e-9));
    }

    #[test]
    fn test_finite_cone_closest_above_cap() {
        let cone = EllipticCone::new(
            Point3::ZERO,
            Vector3::Z,
            Vector3::X,
            FRAC_PI_4,
            FRAC_PI_4,
            4.0,
        )
        .unwrap();
        let p = cone.closest_point_to_point(dvec3(1.0, 0.0, 6.0)).unwrap();
        assert!((p - dvec3(1.0, 0.0, 4.0)).length() < 1e-9);
    }

    #[test]
    fn test_circular_wrappers() {
        let cone = RightCircularCone::new(Point3::ZERO, Vector3::Z, FRAC_PI_4, 4.0).unwrap();
        assert!((cone.half_angle() - FRAC_PI_4).abs() < 1e-12);
        let d = cone.distance_to_point(dvec3(0.0, 0.0, -2.0)).unwrap();
        assert!((d - 2.0).abs() < 1e-12);

        let inf = InfiniteRightCircularCone::new(Point3::ZERO, Vector3::Z, FRAC_PI_4).unwrap();
        let line = Line::new(dvec3(-10.0, 0.0, 5.0), Vector3::X).unwrap();
        assert_eq!(inf.intersections(&line).len(), 2);
    }
}
