//! Orthonormal local frames for surfaces of revolution.

use crate::accurate::cross_accurate;
use crate::{DMat3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};

/// An origin plus a right-handed orthonormal basis `(u, v, w)`, with `w`
/// the revolution axis and `u` derived from a caller-supplied reference
/// direction by Gram-Schmidt.
///
/// `to_local_*` and `to_standard_*` are mutually inverse; the point pair
/// is affine (includes the origin translation), the vector pair is linear.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Frame {
    origin: Point3,
    u: Vector3,
    v: Vector3,
    w: Vector3,
}

impl Frame {
    /// Squared sine of the smallest accepted axis/reference angle.
    const MIN_SIN_SQ: f64 = 1e-24;

    pub fn new(origin: Point3, axis: Vector3, x_ref: Vector3) -> Result<Self> {
        if axis.length_squared() < 1e-24 {
            return Err(GeomError::InvalidShape(
                "frame axis must be a non-zero vector".into(),
            ));
        }
        if x_ref.length_squared() < 1e-24 {
            return Err(GeomError::InvalidShape(
                "frame reference must be a non-zero vector".into(),
            ));
        }
        let w = axis.normalize();
        let r = x_ref.normalize();
        let u = r - r.dot(w) * w;
        if u.length_squared() < Self::MIN_SIN_SQ {
            return Err(GeomError::InvalidShape(
                "frame reference must not be parallel to the axis".into(),
            ));
        }
        let u = u.normalize();
        let v = cross_accurate(w, u);
        Ok(Self { origin, u, v, w })
    }

    /// Frame with an arbitrary (but deterministic) reference direction,
    /// for surfaces of revolution where only the axis matters.
    pub fn from_axis(origin: Point3, axis: Vector3) -> Result<Self> {
        if axis.length_squared() < 1e-24 {
            return Err(GeomError::InvalidShape(
                "frame axis must be a non-zero vector".into(),
            ));
        }
        let n = axis.normalize();
        let x_ref = if n.x.abs() < 0.9 {
            Vector3::X
        } else {
            Vector3::Y
        };
        Self::new(origin, axis, x_ref)
    }

    /// Frame at the given origin with the standard basis.
    pub fn axis_aligned(origin: Point3) -> Self {
        Self {
            origin,
            u: Vector3::X,
            v: Vector3::Y,
            w: Vector3::Z,
        }
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn u(&self) -> Vector3 {
        self.u
    }

    pub fn v(&self) -> Vector3 {
        self.v
    }

    /// The revolution axis.
    pub fn w(&self) -> Vector3 {
        self.w
    }

    /// Change-of-basis matrix with columns `(u, v, w)`.
    pub fn basis_matrix(&self) -> DMat3 {
        DMat3::from_cols(self.u, self.v, self.w)
    }

    pub fn to_local_point(&self, p: Point3) -> Point3 {
        let d = p - self.origin;
        Point3::new(d.dot(self.u), d.dot(self.v), d.dot(self.w))
    }

    pub fn to_standard_point(&self, p: Point3) -> Point3 {
        self.origin + p.x * self.u + p.y * self.v + p.z * self.w
    }

    pub fn to_local_vector(&self, d: Vector3) -> Vector3 {
        Vector3::new(d.dot(self.u), d.dot(self.v), d.dot(self.w))
    }

    pub fn to_standard_vector(&self, d: Vector3) -> Vector3 {
        d.x * self.u + d.y * self.v + d.z * self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    #[test]
    fn test_degenerate_inputs_rejected() {
        assert!(Frame::new(Point3::ZERO, Vector3::ZERO, Vector3::X).is_err());
        assert!(Frame::new(Point3::ZERO, Vector3::Z, Vector3::ZERO).is_err());
        // Reference parallel (and anti-parallel) to the axis
        assert!(Frame::new(Point3::ZERO, Vector3::Z, dvec3(0.0, 0.0, 3.0)).is_err());
        assert!(Frame::new(Point3::ZERO, Vector3::Z, dvec3(0.0, 0.0, -3.0)).is_err());
    }

    #[test]
    fn test_gram_schmidt_orthonormal() {
        let frame = Frame::new(
            dvec3(1.0, -2.0, 0.5),
            dvec3(1.0, 1.0, 1.0),
            dvec3(1.0, 0.0, 0.0),
        )
        .unwrap();
        let m = frame.basis_matrix();
        let id = m * m.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (id.col(i)[j] - expected).abs() < 1e-14,
                    "M * M^T not identity at ({i}, {j})"
                );
            }
        }
        // Right-handed: u x v = w
        assert!((frame.u().cross(frame.v()) - frame.w()).length() < 1e-14);
    }

    #[test]
    fn test_round_trip_points() {
        let frame = Frame::new(
            dvec3(3.0, 1.0, -4.0),
            dvec3(0.0, 1.0, 1.0),
            dvec3(0.0, 1.0, -0.3),
        )
        .unwrap();
        for p in [
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 2.0, 3.0),
            dvec3(-5.5, 0.25, 100.0),
        ] {
            let there = frame.to_local_point(p);
            let back = frame.to_standard_point(there);
            assert!((back - p).length() < 1e-13, "round trip failed for {p:?}");
            let there_v = frame.to_local_vector(p);
            let back_v = frame.to_standard_vector(there_v);
            assert!((back_v - p).length() < 1e-13);
        }
    }

    #[test]
    fn test_axis_maps_to_local_z() {
        let axis = dvec3(1.0, 2.0, 2.0);
        let frame = Frame::new(Point3::ZERO, axis, Vector3::X).unwrap();
        let local = frame.to_local_vector(axis);
        assert!(local.x.abs() < 1e-14);
        assert!(local.y.abs() < 1e-14);
        assert!((local.z - 3.0).abs() < 1e-13); // |(1,2,2)| = 3
    }

    #[test]
    fn test_vectorial_transform_ignores_origin() {
        let frame = Frame::new(dvec3(10.0, 10.0, 10.0), Vector3::Z, Vector3::X).unwrap();
        let v = dvec3(1.0, 2.0, 3.0);
        assert!((frame.to_local_vector(v) - v).length() < 1e-14);
        assert!((frame.to_local_point(v) - (v - dvec3(10.0, 10.0, 10.0))).length() < 1e-14);
    }
}
