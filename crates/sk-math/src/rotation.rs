//! Orientation as an immutable unit quaternion.

use std::f64::consts::PI;
use std::ops::Mul;

use crate::{DMat3, DQuat, EulerRot, Vector3};
use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};

/// A 3D rotation backed by a unit quaternion.
///
/// Supports composition, inversion, spherical interpolation with
/// shortest-path correction, and conversion to and from axis-angle,
/// matrix, and Euler/Cardan angle representations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation(DQuat);

impl Rotation {
    pub fn identity() -> Self {
        Self(DQuat::IDENTITY)
    }

    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Result<Self> {
        if axis.length_squared() < 1e-24 {
            return Err(GeomError::Degenerate(
                "rotation axis must be a non-zero vector".into(),
            ));
        }
        Ok(Self(DQuat::from_axis_angle(axis.normalize(), angle)))
    }

    /// From an orthonormal basis matrix (proper rotation, det = +1).
    pub fn from_basis_matrix(m: &DMat3) -> Self {
        Self(DQuat::from_mat3(m).normalize())
    }

    pub fn from_euler(order: EulerRot, a: f64, b: f64, c: f64) -> Self {
        Self(DQuat::from_euler(order, a, b, c))
    }

    /// Rotation angle in `[0, pi]`.
    pub fn angle(&self) -> f64 {
        let (_, angle) = self.0.to_axis_angle();
        if angle > PI {
            2.0 * PI - angle
        } else {
            angle
        }
    }

    /// Rotation axis; the canonical `+X` is returned for the identity,
    /// where any axis is equally valid.
    pub fn axis(&self) -> Vector3 {
        let (axis, angle) = self.0.to_axis_angle();
        if angle.abs() < 1e-15 || (angle - 2.0 * PI).abs() < 1e-15 {
            return Vector3::X;
        }
        if angle > PI {
            -axis
        } else {
            axis
        }
    }

    pub fn to_basis_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.0)
    }

    pub fn to_euler(&self, order: EulerRot) -> (f64, f64, f64) {
        self.0.to_euler(order)
    }

    /// Apply this rotation to a vector.
    pub fn apply(&self, v: Vector3) -> Vector3 {
        self.0 * v
    }

    /// `self` followed by `other`.
    pub fn compose(&self, other: &Rotation) -> Rotation {
        Rotation((other.0 * self.0).normalize())
    }

    pub fn inverse(&self) -> Rotation {
        Rotation(self.0.inverse())
    }

    /// Spherical linear interpolation toward `other`.
    ///
    /// The target quaternion is negated when the dot product is negative
    /// so that the interpolation follows the shorter arc.
    pub fn slerp(&self, other: &Rotation, t: f64) -> Rotation {
        let end = if self.0.dot(other.0) < 0.0 {
            -other.0
        } else {
            other.0
        };
        Rotation(self.0.slerp(end, t).normalize())
    }

    pub fn quaternion(&self) -> DQuat {
        self.0
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

/// `a * b` applies `b` first, then `a`, matching matrix convention.
impl Mul for Rotation {
    type Output = Rotation;

    fn mul(self, rhs: Rotation) -> Rotation {
        Rotation((self.0 * rhs.0).normalize())
    }
}
