//! The solid-shape capability trait.

use sk_core::Result;
use sk_math::{Line, Point3};

use crate::solver::{golden_min, SolverConfig};

/// Distance and intersection queries shared by every solid shape.
///
/// All methods are pure; shapes are immutable once constructed.
pub trait Solid {
    /// Intersection points of an infinite line with the shape's boundary,
    /// ordered by line abscissa. Tangency yields a single point.
    fn intersections(&self, line: &Line) -> Vec<Point3>;

    /// Closest point on the shape's boundary surface. Defined for
    /// interior queries too, where it is the nearest boundary point.
    fn closest_point_to_point(&self, p: Point3) -> Result<Point3>;

    /// Whether the (closed) solid contains the point.
    fn contains_point(&self, p: Point3) -> bool;

    /// Closest point pair `(on shape, on line)`; both coincide when the
    /// line intersects the shape.
    fn closest_points_to_line(&self, line: &Line) -> Result<(Point3, Point3)>;

    fn intersects(&self, line: &Line) -> bool {
        !self.intersections(line).is_empty()
    }

    /// Distance from a point to the solid: zero inside, distance to the
    /// boundary outside.
    fn distance_to_point(&self, p: Point3) -> Result<f64> {
        if self.contains_point(p) {
            return Ok(0.0);
        }
        Ok((self.closest_point_to_point(p)? - p).length())
    }

    /// Distance from a line to the solid, zero exactly when the line
    /// intersects it.
    fn distance_to_line(&self, line: &Line) -> Result<f64> {
        let (a, b) = self.closest_points_to_line(line)?;
        Ok((a - b).length())
    }
}

/// Shared implementation of [`Solid::closest_points_to_line`] for convex
/// shapes: the point-to-shape distance profile along the line is convex,
/// so a golden-section search over an expanded bracket around the
/// anchor's abscissa finds its minimum.
///
/// `anchor` is a point of the shape (frame origin, apex); `span` its
/// characteristic extent, used to size the initial bracket.
pub(crate) fn convex_line_query<S: Solid + ?Sized>(
    solid: &S,
    line: &Line,
    anchor: Point3,
    span: f64,
    cfg: &SolverConfig,
) -> Result<(Point3, Point3)> {
    let hits = solid.intersections(line);
    if let Some(&p) = hits.first() {
        return Ok((p, p));
    }

    let center = line.abscissa(anchor);
    let reach = line.distance_to_point(anchor) + 2.0 * span + 1.0;
    let mut lo = center - reach;
    let mut hi = center + reach;

    let eval = |t: f64| solid.distance_to_point(line.point_at(t));

    // Expand until the minimum is interior (convexity makes an
    // endpoint-minimum detectable by comparing against a step inward).
    for _ in 0..64 {
        let width = hi - lo;
        let f_lo = eval(lo)?;
        let f_hi = eval(hi)?;
        let just_in_lo = eval(lo + 1e-3 * width)?;
        let just_in_hi = eval(hi - 1e-3 * width)?;
        let grow_lo = f_lo < just_in_lo;
        let grow_hi = f_hi < just_in_hi;
        if !grow_lo && !grow_hi {
            break;
        }
        if grow_lo {
            lo -= width;
        }
        if grow_hi {
            hi += width;
        }
    }

    let t = golden_min(eval, lo, hi, cfg)?;
    let on_line = line.point_at(t);
    let on_shape = solid.closest_point_to_point(on_line)?;
    Ok((on_shape, on_line))
}
