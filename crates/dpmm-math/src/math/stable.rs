//! Numerically stable primitives for log-domain Bayesian math.

use std::f64::consts::PI;

/// ln(2π).
pub const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// ln(π).
pub const LN_PI: f64 = 1.144_729_885_849_400_2;

/// Below this argument `log_gamma` shifts upward with the recurrence
/// before applying the asymptotic series.
const STIRLING_MIN: f64 = 10.0;

/// Coefficients B_2k / (2k (2k-1)) of the Stirling series in 1/z.
const STIRLING_TERMS: [f64; 7] = [
    1.0 / 12.0,
    -1.0 / 360.0,
    1.0 / 1260.0,
    -1.0 / 1680.0,
    1.0 / 1188.0,
    -691.0 / 360_360.0,
    1.0 / 156.0,
];

/// ln Σ exp(v) in one pass, rescaling the running sum whenever a new
/// maximum appears.
///
/// Empty input and all -inf give -inf; any NaN gives NaN.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        if v.is_nan() {
            return f64::NAN;
        }
        if v == f64::INFINITY {
            return f64::INFINITY;
        }
        if v <= max {
            sum += (v - max).exp();
        } else if max == f64::NEG_INFINITY {
            max = v;
            sum = 1.0;
        } else {
            sum = sum * (max - v).exp() + 1.0;
            max = v;
        }
    }
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + sum.ln()
}

/// ln(exp(a) + exp(b)).
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi.is_nan() || lo.is_nan() {
        return f64::NAN;
    }
    if lo == f64::NEG_INFINITY || hi == f64::INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// Log weights shifted so their exponentials sum to one.
///
/// `None` if the normalizer is not finite: empty input, a NaN, all weights
/// -inf, or an infinite weight.
pub fn normalize_log_probs(log_weights: &[f64]) -> Option<Vec<f64>> {
    let norm = log_sum_exp(log_weights);
    norm.is_finite()
        .then(|| log_weights.iter().map(|w| w - norm).collect())
}

/// ln |Γ(z)|.
///
/// Stirling series for z ≥ 10, upward recurrence below that, and the
/// reflection formula for z < 1/2. Poles (0, -1, -2, ...) give NaN.
pub fn log_gamma(z: f64) -> f64 {
    if z.is_nan() || z == f64::NEG_INFINITY {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return f64::INFINITY;
    }
    if z < 0.5 {
        // Γ(z) Γ(1-z) = π / sin(πz)
        let sin_pi = (PI * z).sin();
        if z == z.floor() || sin_pi == 0.0 {
            return f64::NAN;
        }
        return LN_PI - sin_pi.abs().ln() - log_gamma(1.0 - z);
    }

    let mut x = z;
    let mut shift = 1.0;
    while x < STIRLING_MIN {
        shift *= x;
        x += 1.0;
    }
    stirling(x) - shift.ln()
}

fn stirling(x: f64) -> f64 {
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let series = STIRLING_TERMS
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * inv2 + c)
        * inv;
    (x - 0.5) * x.ln() - x + 0.5 * LN_2PI + series
}

/// ln Γ_d(a) = d(d-1)/4 · ln π + Σ_{j=1..d} ln Γ(a + (1-j)/2).
///
/// NaN for d = 0 or a ≤ (d-1)/2.
pub fn log_mv_gamma(d: usize, a: f64) -> f64 {
    let p = d as f64;
    if d == 0 || a.is_nan() || a <= (p - 1.0) / 2.0 {
        return f64::NAN;
    }
    (1..=d).fold(p * (p - 1.0) / 4.0 * LN_PI, |acc, j| {
        acc + log_gamma(a - 0.5 * (j as f64 - 1.0))
    })
}
