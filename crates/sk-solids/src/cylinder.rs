//! Elliptic and circular cylinders, finite and infinite.

use sk_math::dvec2;
use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};
use sk_math::{Frame, Line, Point3, Vector3};

use crate::ellipse::closest_point_on_ellipse;
use crate::quadric::{intersect_line_with_quadric, QuadricForm};
use crate::solid::{convex_line_query, Solid};
use crate::solver::SolverConfig;

const DOMAIN_TOL: f64 = 1e-12;

fn check_semi_axis(name: &str, v: f64) -> Result<()> {
    if !(v > 0.0) || !v.is_finite() {
        return Err(GeomError::InvalidShape(format!(
            "cylinder semi-axis {name} must be strictly positive, got {v}"
        )));
    }
    Ok(())
}

/// Infinite cylinder with elliptic cross-section: semi-axis `a` along the
/// frame reference direction, `b` along the orthogonal one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfiniteEllipticCylinder {
    frame: Frame,
    a: f64,
    b: f64,
    solver: SolverConfig,
}

impl InfiniteEllipticCylinder {
    pub fn new(origin: Point3, axis: Vector3, x_ref: Vector3, a: f64, b: f64) -> Result<Self> {
        check_semi_axis("a", a)?;
        check_semi_axis("b", b)?;
        Ok(Self {
            frame: Frame::new(origin, axis, x_ref)?,
            a,
            b,
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

    pub fn semi_axes(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    fn form(&self) -> QuadricForm {
        QuadricForm::diagonal(1.0 / (self.a * self.a), 1.0 / (self.b * self.b), 0.0, -1.0)
    }

    fn cross_section(&self, p: Point3) -> f64 {
        (p.x / self.a) * (p.x / self.a) + (p.y / self.b) * (p.y / self.b)
    }
}

impl Solid for InfiniteEllipticCylinder {
    fn intersections(&self, line: &Line) -> Vec<Point3> {
        intersect_line_with_quadric(&self.form(), &self.frame, line, |_| true)
    }

    fn closest_point_to_point(&self, p: Point3) -> Result<Point3> {
        let l = self.frame.to_local_point(p);
        let e = closest_point_on_ellipse(self.a, self.b, dvec2(l.x, l.y), &self.solver)?;
        Ok(self.frame.to_standard_point(Point3::new(e.x, e.y, l.z)))
    }

    fn contains_point(&self, p: Point3) -> bool {
        self.cross_section(self.frame.to_local_point(p)) <= 1.0 + DOMAIN_TOL
    }

    fn closest_points_to_line(&self, line: &Line) -> Result<(Point3, Point3)> {
        convex_line_query(
            self,
            line,
            self.frame.origin(),
            self.a.max(self.b),
            &self.solver,
        )
    }
}

/// Finite elliptic cylinder, centered on its origin and bounded by two
/// elliptic caps at `z = +/- height / 2` in the local frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EllipticCylinder {
    frame: Frame,
    a: f64,
    b: f64,
    half_height: f64,
    solver: SolverConfig,
}

impl EllipticCylinder {
    pub fn new(
        origin: Point3,
        axis: Vector3,
        x_ref: Vector3,
        a: f64,
        b: f64,
        height: f64,
    ) -> Result<Self> {
        check_semi_axis("a", a)?;
        check_semi_axis("b", b)?;
        if !(height > 0.0) || !height.is_finite() {
            return Err(GeomError::InvalidShape(format!(
                "cylinder height must be strictly positive, got {height}"
            )));
        }
        Ok(Self {
            frame: Frame::new(origin, axis, x_ref)?,
            a,
            b,
            half_height: height / 2.0,
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

    pub fn semi_axes(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    pub fn height(&self) -> f64 {
        2.0 * self.half_height
    }

    fn form(&self) -> QuadricForm {
        QuadricForm::diagonal(1.0 / (self.a * self.a), 1.0 / (self.b * self.b), 0.0, -1.0)
    }

    fn cross_section(&self, p: Point3) -> f64 {
        (p.x / self.a) * (p.x / self.a) + (p.y / self.b) * (p.y / self.b)
    }

    /// Intersections with the two cap disks, in local coordinates.
    fn cap_hits_local(&self, o: Point3, d: Point3) -> Vec<Point3> {
        let mut hits = Vec::new();
        if d.z.abs() < 1e-14 {
            return hits;
        }
        for zc in [-self.half_height, self.half_height] {
            let t = (zc - o.z) / d.z;
            let p = o + t * d;
            if self.cross_section(p) <= 1.0 + DOMAIN_TOL {
                hits.push(p);
            }
        }
        hits
    }
}

impl Solid for EllipticCylinder {
    fn intersections(&self, line: &Line) -> Vec<Point3> {
        let h2 = self.half_height;
        let mut pts = intersect_line_with_quadric(&self.form(), &self.frame, line, |p| {
            p.z.abs() <= h2 + DOMAIN_TOL
        });

        let o = self.frame.to_local_point(line.origin());
        let d = self.frame.to_local_vector(line.direction());
        for p in self.cap_hits_local(o, d) {
            let std = self.frame.to_standard_point(p);
            if pts.iter().all(|q| (*q - std).length() > 1e-9) {
                pts.push(std);
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
        let e = closest_point_on_ellipse(self.a, self.b, dvec2(l.x, l.y), &self.solver)?;
        let h2 = self.half_height;

        let side = Point3::new(e.x, e.y, l.z.clamp(-h2, h2));
        let mut best = side;
        let inside_section = self.cross_section(l) <= 1.0;
        for zc in [-h2, h2] {
            let cap = if inside_section {
                Point3::new(l.x, l.y, zc)
            } else {
                Point3::new(e.x, e.y, zc)
            };
            if (cap - l).length_squared() < (best - l).length_squared() {
                best = cap;
            }
        }
        Ok(self.frame.to_standard_point(best))
    }

    fn contains_point(&self, p: Point3) -> bool {
        let l = self.frame.to_local_point(p);
        self.cross_section(l) <= 1.0 + DOMAIN_TOL && l.z.abs() <= self.half_height + DOMAIN_TOL
    }

    fn closest_points_to_line(&self, line: &Line) -> Result<(Point3, Point3)> {
        let span = self.a.max(self.b).max(self.half_height);
        convex_line_query(self, line, self.frame.origin(), span, &self.solver)
    }
}

macro_rules! delegate_solid {
    ($outer:ty, $field:ident) => {
        impl Solid for $outer {
            fn intersections(&self, line: &Line) -> Vec<Point3> {
                self.$field.intersections(line)
            }
            fn closest_point_to_point(&self, p: Point3) -> Result<Point3> {
                self.$field.closest_point_to_point(p)
            }
            fn contains_point(&self, p: Point3) -> bool {
                self.$field.contains_point(p)
            }
            fn closest_points_to_line(&self, line: &Line) -> Result<(Point3, Point3)> {
                self.$field.closest_points_to_line(line)
            }
        }
    };
}
pub(crate) use delegate_solid;

/// Infinite circular cylinder: the equal-axes special case. Only the
/// revolution axis is needed; the in-plane reference is chosen
/// deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfiniteRightCircularCylinder {
    inner: InfiniteEllipticCylinder,
}

impl InfiniteRightCircularCylinder {
    pub fn new(origin: Point3, axis: Vector3, radius: f64) -> Result<Self> {
        let frame = Frame::from_axis(origin, axis)?;
        Ok(Self {
            inner: InfiniteEllipticCylinder::new(origin, axis, frame.u(), radius, radius)?,
        })
    }

    pub fn radius(&self) -> f64 {
        self.inner.a
    }

    pub fn frame(&self) -> &Frame {
        self.inner.frame()
    }
}

delegate_solid!(InfiniteRightCircularCylinder, inner);

/// Finite circular cylinder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightCircularCylinder {
    inner: EllipticCylinder,
}

impl RightCircularCylinder {
    pub fn new(origin: Point3, axis: Vector3, radius: f64, height: f64) -> Result<Self> {
        let frame = Frame::from_axis(origin, axis)?;
        Ok(Self {
            inner: EllipticCylinder::new(origin, axis, frame.u(), radius, radius, height)?,
        })
    }

    pub fn radius(&self) -> f64 {
        self.inner.a
    }

    pub fn height(&self) -> f64 {
        self.inner.height()
    }

    pub fn frame(&self) -> &Frame {
        self.inner.frame()
    }
}

delegate_solid!(RightCircularCylinder, inner);
