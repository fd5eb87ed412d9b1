//! Shared helpers for the dpmm-core integration tests.
//!
//! The quadrature rules map infinite ranges onto bounded angles
//! (x = c + s·tan θ) and apply composite Simpson on θ, which is accurate
//! to well below 1e-8 for the smooth, polynomially decaying densities used
//! here.

#![allow(dead_code)]

use std::f64::consts::{FRAC_PI_2, PI};

/// Beyond this |ln v| the positive-axis rule treats the integrand as zero.
const LOG_CUTOFF: f64 = 300.0;

fn simpson_weight(k: usize) -> f64 {
    if k % 2 == 1 {
        4.0
    } else {
        2.0
    }
}

/// ∫ f(x) dx over the real line.
///
/// `center` and `scale` should roughly match the bulk of `f`. The
/// endpoint contributions are taken as zero, which requires
/// f(x)·x² → 0 as |x| → ∞.
pub fn integrate_line<F: FnMut(f64) -> f64>(mut f: F, center: f64, scale: f64, n: usize) -> f64 {
    let n = n + n % 2;
    let h = PI / n as f64;
    let mut total = 0.0;
    for k in 1..n {
        let theta = -FRAC_PI_2 + k as f64 * h;
        let cos = theta.cos();
        let x = center + scale * theta.tan();
        total += simpson_weight(k) * f(x) * scale / (cos * cos);
    }
    total * h / 3.0
}

/// ∫ f(v) dv over v > 0, via v = exp(u) with u on the real line.
/// `log_center` is the center in ln v.
pub fn integrate_positive<F: FnMut(f64) -> f64>(
    mut f: F,
    log_center: f64,
    log_scale: f64,
    n: usize,
) -> f64 {
    integrate_line(
        |u| {
            if u.abs() > LOG_CUTOFF {
                return 0.0;
            }
            let v = u.exp();
            f(v) * v
        },
        log_center,
        log_scale,
        n,
    )
}

/// ∫∫ f(x, y) dx dy over the plane in polar coordinates around `center`.
pub fn integrate_plane<F: FnMut(f64, f64) -> f64>(
    mut f: F,
    center: (f64, f64),
    scale: f64,
    n_radial: usize,
    n_angular: usize,
) -> f64 {
    let n_radial = n_radial + n_radial % 2;
    let h = FRAC_PI_2 / n_radial as f64;
    let mut total = 0.0;
    for j in 0..n_angular {
        let phi = 2.0 * PI * j as f64 / n_angular as f64;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let mut ray = 0.0;
        for k in 1..n_radial {
            let theta = k as f64 * h;
            let cos = theta.cos();
            let r = scale * theta.tan();
            let value = f(center.0 + r * cos_phi, center.1 + r * sin_phi);
            ray += simpson_weight(k) * value * r * scale / (cos * cos);
        }
        total += ray * h / 3.0;
    }
    total * 2.0 * PI / n_angular as f64
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{}: got {}, expected {} (tol {})",
        what,
        actual,
        expected,
        tol
    );
}

/// Deterministic draws from N(mean, var): inverse-CDF at stratified
/// quantiles, so cluster fixtures do not depend on an RNG.
pub fn stratified_normal(mean: f64, var: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let p = (i as f64 + 0.5) / n as f64;
            mean + var.sqrt() * inverse_normal_cdf(p)
        })
        .collect()
}

/// Acklam's rational approximation to Φ⁻¹, relative error below 1.2e-9.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];
    const P_LOW: f64 = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}
