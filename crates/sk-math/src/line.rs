use crate::accurate::cross_accurate;
use crate::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};

/// An infinite line in 3D space defined by an origin and a unit direction.
///
/// Points on the line are addressed by their signed abscissa along the
/// direction, negative values falling behind the origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
}

impl Line {
    /// Minimum squared length accepted for a direction vector.
    const MIN_DIR_SQ: f64 = 1e-24;

    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        if direction.length_squared() < Self::MIN_DIR_SQ {
            return Err(GeomError::InvalidShape(
                "line direction must be a non-zero vector".into(),
            ));
        }
        Ok(Self {
            origin,
            direction: direction.normalize(),
        })
    }

    /// A line through two distinct points.
    pub fn through(a: Point3, b: Point3) -> Result<Self> {
        Self::new(a, b - a)
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Unit direction of the line.
    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    /// Point at the given signed abscissa.
    pub fn point_at(&self, abscissa: f64) -> Point3 {
        self.origin + self.direction * abscissa
    }

    /// Signed abscissa of the orthogonal projection of `point`.
    pub fn abscissa(&self, point: Point3) -> f64 {
        (point - self.origin).dot(self.direction)
    }

    /// Orthogonal projection of `point` onto the line.
    pub fn closest_point_to(&self, point: Point3) -> Point3 {
        self.point_at(self.abscissa(point))
    }

    pub fn distance_to_point(&self, point: Point3) -> f64 {
        (point - self.closest_point_to(point)).length()
    }

    pub fn contains(&self, point: Point3, tol: f64) -> bool {
        self.distance_to_point(point) < tol
    }

    /// Closest points between two lines, `(on self, on other)`.
    ///
    /// For parallel lines the pair is not unique; the projection of this
    /// line's origin onto the other is returned.
    pub fn closest_points_with(&self, other: &Line) -> (Point3, Point3) {
        let d1 = self.direction;
        let d2 = other.direction;
        let w0 = self.origin - other.origin;

        let b = d1.dot(d2);
        // 1 - b^2 cancels catastrophically for nearly parallel lines.
        let denom = cross_accurate(d1, d2).length_squared();
        if denom < 1e-24 {
            let p1 = self.origin;
            return (p1, other.closest_point_to(p1));
        }

        let d = d1.dot(w0);
        let e = d2.dot(w0);
        let s = (b * e - d) / denom;
        let t = (e - b * d) / denom;
        (self.point_at(s), other.point_at(t))
    }

    pub fn distance_to_line(&self, other: &Line) -> f64 {
        let (p1, p2) = self.closest_points_with(other);
        (p1 - p2).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    #[test]
    fn test_zero_direction_rejected() {
        assert!(Line::new(Point3::ZERO, Vector3::ZERO).is_err());
    }

    #[test]
    fn test_point_at_and_abscissa_round_trip() {
        let line = Line::new(dvec3(1.0, 2.0, 3.0), dvec3(0.0, 0.0, 2.0)).unwrap();
        let p = line.point_at(4.5);
        assert!((p - dvec3(1.0, 2.0, 7.5)).length() < 1e-12);
        assert!((line.abscissa(p) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_distance_to_point() {
        let line = Line::new(Point3::ZERO, Vector3::X).unwrap();
        assert!((line.distance_to_point(dvec3(5.0, 3.0, 0.0)) - 3.0).abs() < 1e-12);
        // Behind the origin counts too: the line is infinite.
        assert!((line.distance_to_point(dvec3(-7.0, 0.0, 4.0)) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_skew_lines_closest_points() {
        let l1 = Line::new(Point3::ZERO, Vector3::X).unwrap();
        let l2 = Line::new(dvec3(0.0, 1.0, 2.0), Vector3::Y).unwrap();
        let (p1, p2) = l1.closest_points_with(&l2);
        assert!((p1 - Point3::ZERO).length() < 1e-12);
        assert!((p2 - dvec3(0.0, 0.0, 2.0)).length() < 1e-12);
        assert!((l1.distance_to_line(&l2) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_lines_distance() {
        let l1 = Line::new(Point3::ZERO, Vector3::X).unwrap();
        let l2 = Line::new(dvec3(10.0, 3.0, 4.0), dvec3(-2.0, 0.0, 0.0)).unwrap();
        assert!((l1.distance_to_line(&l2) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_intersecting_lines_distance_zero() {
        let l1 = Line::new(dvec3(1.0, 1.0, 0.0), dvec3(1.0, 1.0, 1.0)).unwrap();
        let l2 = Line::new(dvec3(2.0, 2.0, 1.0), dvec3(0.0, 1.0, 0.0)).unwrap();
        assert!(l1.distance_to_line(&l2) < 1e-12);
    }

    #[test]
    fn test_serde_round_trip() {
        let line = Line::new(dvec3(1.0, 2.0, 3.0), Vector3::Z).unwrap();
        let json = serde_json::to_string(&line).unwrap();
        let back: Line = serde_json::from_str(&json).unwrap();
        assert!((back.origin() - line.origin()).length() < 1e-15);
        assert!((back.direction() - line.direction()).length() < 1e-15);
    }
}
