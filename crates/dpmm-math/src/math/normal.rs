//! Univariate Gaussian and Student-t log densities.
//!
//! Both densities are parameterized by a *variance-like* scale: the Gaussian
//! takes its variance σ², the Student-t takes the square of its scale s² so
//! that `t_ν(μ, s²)` approaches `N(μ, s²)` as ν → ∞.

use super::stable::{log_gamma, LN_2PI, LN_PI};

/// Log of the Gaussian PDF N(x | mean, var).
///
/// Returns NaN for non-positive or non-finite variance.
pub fn normal_log_pdf(x: f64, mean: f64, var: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || var.is_nan() {
        return f64::NAN;
    }
    if var <= 0.0 || var.is_infinite() {
        return f64::NAN;
    }
    let z = (x - mean) / var.sqrt();
    -0.5 * (LN_2PI + var.ln() + z * z)
}

/// Log of the location-scale Student-t PDF t_ν(x | loc, scale2).
///
/// f(x) = Γ((ν+1)/2) / (Γ(ν/2) √(νπ s²)) · (1 + (x-μ)²/(ν s²))^(-(ν+1)/2)
pub fn student_t_log_pdf(x: f64, loc: f64, df: f64, scale2: f64) -> f64 {
    if x.is_nan() || loc.is_nan() || df.is_nan() || scale2.is_nan() {
        return f64::NAN;
    }
    if df <= 0.0 || scale2 <= 0.0 || scale2.is_infinite() {
        return f64::NAN;
    }
    let half_df_plus = 0.5 * (df + 1.0);
    log_gamma(half_df_plus)
        - log_gamma(0.5 * df)
        - 0.5 * (df.ln() + LN_PI + scale2.ln())
        - half_df_plus * ln_1p_square((x - loc) / (df * scale2).sqrt())
}

/// ln(1 + z²) without squaring a huge z.
fn ln_1p_square(z: f64) -> f64 {
    let a = z.abs();
    if a > 1e150 {
        2.0 * a.ln() + (a * a).recip().ln_1p()
    } else {
        (a * a).ln_1p()
    }
}
