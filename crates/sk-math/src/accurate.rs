//! Compensated floating-point products for near-cancellation cases.
//!
//! Built on `f64::mul_add` error-free transformations; used where naive
//! evaluation loses all significant digits (quadratic discriminants,
//! cross products of nearly parallel vectors).

use crate::Vector3;

/// `a * b` split into rounded result and exact rounding error.
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

/// `a + b` split into rounded result and exact rounding error.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    (s, (a - (s - bb)) + (b - bb))
}

/// Compute `a * b - c * d` with a single-rounding correction term.
#[inline]
pub fn diff_of_products(a: f64, b: f64, c: f64, d: f64) -> f64 {
    let cd = c * d;
    let err = (-c).mul_add(d, cd);
    a.mul_add(b, -cd) + err
}

/// Compensated dot product of two 3-vectors.
pub fn dot_accurate(u: Vector3, v: Vector3) -> f64 {
    let (p0, e0) = two_prod(u.x, v.x);
    let (p1, e1) = two_prod(u.y, v.y);
    let (s0, e2) = two_sum(p0, p1);
    let (p2, e3) = two_prod(u.z, v.z);
    let (s1, e4) = two_sum(s0, p2);
    s1 + (e0 + e1 + e2 + e3 + e4)
}

/// Compensated cross product of two 3-vectors.
pub fn cross_accurate(u: Vector3, v: Vector3) -> Vector3 {
    Vector3::new(
        diff_of_products(u.y, v.z, u.z, v.y),
        diff_of_products(u.z, v.x, u.x, v.z),
        diff_of_products(u.x, v.y, u.y, v.x),
    )
}
