//! Scalar solvers shared by the closest-point computations.

use serde::{Deserialize, Serialize};
use sk_core::{GeomError, Result};
use sk_math::accurate::diff_of_products;

/// Convergence settings for the iterative solvers.
///
/// Carried by each shape at construction; there is no process-wide
/// mutable threshold. A threshold tighter than the iteration budget can
/// reach fails with [`GeomError::Convergence`] instead of looping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Residual magnitude at which the iteration is accepted.
    pub threshold: f64,
    /// Iteration budget before giving up.
    pub max_iterations: u32,
}

impl SolverConfig {
    pub const DEFAULT_THRESHOLD: f64 = 1e-11;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

    pub fn new(threshold: f64, max_iterations: u32) -> Self {
        Self {
            threshold,
            max_iterations,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Real roots of `a x^2 + b x + c = 0`, ascending.
///
/// Falls back to the linear equation when `a` vanishes, and collapses
/// near-tangent configurations (discriminant within rounding noise of
/// zero) to a single root.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return Vec::new();
    }
    if a.abs() < 1e-14 * scale {
        if b.abs() < 1e-14 * scale {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let disc = diff_of_products(b, b, 4.0 * a, c);
    let noise = 1e-14 * (b * b + (4.0 * a * c).abs());
    if disc < -noise {
        return Vec::new();
    }
    if disc <= noise {
        return vec![-b / (2.0 * a)];
    }

    // Citardauq form avoids cancellation in the smaller root.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let r0 = q / a;
    let r1 = c / q;
    if r0 < r1 {
        vec![r0, r1]
    } else {
        vec![r1, r0]
    }
}

/// Root of the secular equation
/// `F(t) = sum_i (e_i q_i / (t + e_i^2))^2 - 1 = 0`
/// on the branch `t > -min(e_i^2)`, where all `q_i > 0`.
///
/// `F` is convex and strictly decreasing there, so the Newton iteration
/// from the lower bracket edge converges monotonically; a bisection
/// safeguard keeps the iterate inside the bracket. Convergence is judged
/// on the residual `|F(t)|` against the configured threshold.
pub(crate) fn secular_root(terms: &[(f64, f64)], cfg: &SolverConfig) -> Result<f64> {
    debug_assert!(terms.iter().all(|&(e, q)| e > 0.0 && q > 0.0));

    let eval = |t: f64| -> (f64, f64) {
        let mut f = -1.0;
        let mut df = 0.0;
        for &(e, q) in terms {
            let r = e * q / (t + e * e);
            f += r * r;
            df += -2.0 * r * r / (t + e * e);
        }
        (f, df)
    };

    let t_min = terms
        .iter()
        .map(|&(e, _)| e * e)
        .fold(f64::INFINITY, f64::min);

    // Bracket the root: F > 0 just above the pole, F < 0 for t large.
    let scale: f64 = terms.iter().map(|&(e, q)| (e * q) * (e * q)).sum::<f64>();
    let scale = scale.sqrt().max(t_min);
    let mut lo = -t_min + 1e-300_f64.max(1e-15 * t_min);
    let mut hi = scale * (terms.len() as f64).sqrt();
    let mut guard = 0;
    while eval(hi).0 > 0.0 {
        hi = 2.0 * hi + scale;
        guard += 1;
        if guard > 200 {
            return Err(GeomError::Convergence {
                threshold: cfg.threshold,
                iterations: cfg.max_iterations,
            });
        }
    }

    let mut t = 0.5 * (lo + hi);
    for _ in 0..cfg.max_iterations {
        let (f, df) = eval(t);
        if f.abs() < cfg.threshold {
            return Ok(t);
        }
        if f > 0.0 {
            lo = t;
        } else {
            hi = t;
        }
        let newton = if df != 0.0 { t - f / df } else { t };
        t = if newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }
    Err(GeomError::Convergence {
        threshold: cfg.threshold,
        iterations: cfg.max_iterations,
    })
}

/// Golden-section minimization of a unimodal scalar function over
/// `[lo, hi]`, accepting the interval once it shrinks below the
/// threshold scaled by the bracket width.
pub(crate) fn golden_min<F>(mut f: F, mut lo: f64, mut hi: f64, cfg: &SolverConfig) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    const INV_PHI: f64 = 0.618_033_988_749_894_9;
    let tol = cfg.threshold.max(1e-14) * (1.0 + hi.abs().max(lo.abs()));

    let mut a = hi - INV_PHI * (hi - lo);
    let mut b = lo + INV_PHI * (hi - lo);
    let mut fa = f(a)?;
    let mut fb = f(b)?;
    for _ in 0..cfg.max_iterations.max(200) {
        if (hi - lo).abs() < tol {
            break;
        }
        if fa < fb {
            hi = b;
            b = a;
            fb = fa;
            a = hi - INV_PHI * (hi - lo);
            fa = f(a)?;
        } else {
            lo = a;
            a = b;
            fa = fb;
            b = lo + INV_PHI * (hi - lo);
            fb = f(b)?;
        }
    }
    Ok(0.5 * (lo + hi))
}
