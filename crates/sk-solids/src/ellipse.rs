//! Closest point on an origin-centered, axis-aligned ellipse.
//!
//! The 2D building block behind the cylinder and cone-cap solvers, and
//! the planar reduction of the ellipsoid solver.

use sk_core::Result;
use sk_math::Point2;

use crate::solver::{secular_root, SolverConfig};

/// Closest point on the ellipse `(x/e0)^2 + (y/e1)^2 = 1` to `p`.
///
/// Interior queries are projected to the boundary. A query on a symmetry
/// axis resolves to a canonical representative: the positive-quadrant
/// solution, and for the exact center the vertex of the smaller
/// semi-axis (ties going to the `e0` vertex).
pub(crate) fn closest_point_on_ellipse(
    e0: f64,
    e1: f64,
    p: Point2,
    cfg: &SolverConfig,
) -> Result<Point2> {
    let q0 = p.x.abs();
    let q1 = p.y.abs();

    let x = if q0 > 0.0 && q1 > 0.0 {
        let t = secular_root(&[(e0, q0), (e1, q1)], cfg)?;
        Point2::new(e0 * e0 * q0 / (t + e0 * e0), e1 * e1 * q1 / (t + e1 * e1))
    } else if q0 == 0.0 && q1 == 0.0 {
        if e1 < e0 {
            Point2::new(0.0, e1)
        } else {
            Point2::new(e0, 0.0)
        }
    } else if q1 == 0.0 {
        on_axis(e0, e1, q0)
    } else {
        let m = on_axis(e1, e0, q1);
        Point2::new(m.y, m.x)
    };

    Ok(Point2::new(x.x.copysign(p.x), x.y.copysign(p.y)))
}

/// Query on the `e0` axis at `u >= 0`: either the `(e0, 0)` vertex or,
/// for a wide ellipse with the query inside the evolute, the off-axis
/// critical point.
fn on_axis(e0: f64, e1: f64, u: f64) -> Point2 {
    if e0 * e0 > e1 * e1 {
        let cusp = (e0 * e0 - e1 * e1) / e0;
        if u < cusp {
            let x0 = e0 * e0 * u / (e0 * e0 - e1 * e1);
            let s = 1.0 - (x0 / e0) * (x0 / e0);
            if s > 0.0 {
                return Point2::new(x0, e1 * s.sqrt());
            }
        }
    }
    Point2::new(e0, 0.0)
}
