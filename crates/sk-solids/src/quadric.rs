//! Implicit quadratic forms and their substitution along a line.

use nalgebra::{Matrix3, Vector3 as NaVector3};
use sk_math::{Frame, Line, Point3};

use crate::solver::solve_quadratic;

fn na(v: Point3) -> NaVector3<f64> {
    NaVector3::new(v.x, v.y, v.z)
}

/// The implicit surface `x^T Q x + 2 l . x + c = 0` expressed in a
/// shape's local frame.
#[derive(Debug, Clone)]
pub struct QuadricForm {
    pub q: Matrix3<f64>,
    pub l: NaVector3<f64>,
    pub c: f64,
}

impl QuadricForm {
    /// Axis-aligned form `sum_i d_i x_i^2 + c = 0` (covers ellipsoids,
    /// elliptic cylinders and one-sheet cones in canonical position).
    pub fn diagonal(dx: f64, dy: f64, dz: f64, c: f64) -> Self {
        Self {
            q: Matrix3::from_diagonal(&NaVector3::new(dx, dy, dz)),
            l: NaVector3::zeros(),
            c,
        }
    }

    pub fn evaluate(&self, p: Point3) -> f64 {
        let x = na(p);
        (x.transpose() * self.q * x)[(0, 0)] + 2.0 * self.l.dot(&x) + self.c
    }

    /// Coefficients of the quadratic in the line abscissa obtained by
    /// substituting `origin + t * dir` (both in local coordinates).
    pub fn line_coefficients(&self, origin: Point3, dir: Point3) -> (f64, f64, f64) {
        let o = na(origin);
        let d = na(dir);
        let qd = self.q * d;
        let qo = self.q * o;
        let a = d.dot(&qd);
        let b = 2.0 * (d.dot(&qo) + self.l.dot(&d));
        let c = o.dot(&qo) + 2.0 * self.l.dot(&o) + self.c;
        (a, b, c)
    }
}

/// Intersect a line with a quadric given in `frame`-local coordinates,
/// keeping only the roots whose local point satisfies `domain` (finite
/// extent constraints: height range, nappe, aperture).
///
/// Returned points are in standard coordinates, ordered by line abscissa.
pub fn intersect_line_with_quadric<D>(
    form: &QuadricForm,
    frame: &Frame,
    line: &Line,
    domain: D,
) -> Vec<Point3>
where
    D: Fn(Point3) -> bool,
{
    let o = frame.to_local_point(line.origin());
    let d = frame.to_local_vector(line.direction());
    let (a, b, c) = form.line_coefficients(o, d);
    solve_quadratic(a, b, c)
        .into_iter()
        .map(|t| o + t * d)
        .filter(|p| domain(*p))
        .map(|p| frame.to_standard_point(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_math::dvec3;
    use sk_math::Vector3;

    #[test]
    fn test_unit_sphere_diagonal_form() {
        let sphere = QuadricForm::diagonal(1.0, 1.0, 1.0, -1.0);
        assert!(sphere.evaluate(dvec3(1.0, 0.0, 0.0)).abs() < 1e-12);
        assert!(sphere.evaluate(dvec3(0.0, 0.0, 2.0)) > 0.0);
        assert!(sphere.evaluate(Point3::ZERO) < 0.0);
    }

    #[test]
    fn test_line_through_unit_sphere() {
        let sphere = QuadricForm::diagonal(1.0, 1.0, 1.0, -1.0);
        let frame = Frame::axis_aligned(Point3::ZERO);
        let line = Line::new(dvec3(-5.0, 0.0, 0.0), Vector3::X).unwrap();
        let pts = intersect_line_with_quadric(&sphere, &frame, &line, |_| true);
        assert_eq!(pts.len(), 2);
        assert!((pts[0] - dvec3(-1.0, 0.0, 0.0)).length() < 1e-12);
        assert!((pts[1] - dvec3(1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_domain_filter_discards_roots() {
        let sphere = QuadricForm::diagonal(1.0, 1.0, 1.0, -1.0);
        let frame = Frame::axis_aligned(Point3::ZERO);
        let line = Line::new(dvec3(-5.0, 0.0, 0.0), Vector3::X).unwrap();
        let pts = intersect_line_with_quadric(&sphere, &frame, &line, |p| p.x > 0.0);
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - dvec3(1.0, 0.0, 0.0)).length() < 1e-12);
    }
}
