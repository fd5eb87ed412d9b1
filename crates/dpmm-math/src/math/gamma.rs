//! Gamma-family densities for variance parameters.
//!
//! Provides log densities for the Gamma, Inverse-Gamma and scaled
//! Inverse-Chi-Squared distributions used as conjugate priors on a Gaussian
//! variance.
//!
//! # Parameterization
//!
//! - `Gamma(α, β)` uses the **rate** parameterization:
//!   `f(t) = β^α / Γ(α) * t^(α-1) * e^(-βt)`
//! - `InvGamma(α, β)` uses the **scale** parameterization:
//!   `f(v) = β^α / Γ(α) * v^(-α-1) * e^(-β/v)`
//! - `ScaledInvChi2(ν, s²)` is `InvGamma(ν/2, ν s²/2)`.

use super::stable::log_gamma;

/// α ln β − ln Γ(α), shared by both parameterizations. NaN unless α, β > 0.
fn shape_rate_norm(alpha: f64, beta: f64) -> f64 {
    if alpha > 0.0 && beta > 0.0 {
        alpha * beta.ln() - log_gamma(alpha)
    } else {
        f64::NAN
    }
}

/// Log density of Gamma(α, β) (rate β) at `t`.
///
/// The boundary t = 0 is +inf for α < 1, ln β for α = 1 and -inf otherwise.
pub fn gamma_log_pdf(t: f64, alpha: f64, beta: f64) -> f64 {
    let norm = shape_rate_norm(alpha, beta);
    if t.is_nan() || norm.is_nan() {
        return f64::NAN;
    }
    match t.partial_cmp(&0.0) {
        Some(std::cmp::Ordering::Less) => f64::NEG_INFINITY,
        Some(std::cmp::Ordering::Equal) if alpha < 1.0 => f64::INFINITY,
        Some(std::cmp::Ordering::Equal) if alpha == 1.0 => beta.ln(),
        Some(std::cmp::Ordering::Equal) => f64::NEG_INFINITY,
        _ => norm + (alpha - 1.0) * t.ln() - beta * t,
    }
}

/// Log of the Inverse-Gamma PDF at v (shape α, scale β).
///
/// Returns -inf for v <= 0 and NaN for invalid parameters.
pub fn inv_gamma_log_pdf(v: f64, alpha: f64, beta: f64) -> f64 {
    let norm = shape_rate_norm(alpha, beta);
    if v.is_nan() || norm.is_nan() {
        return f64::NAN;
    }
    if v <= 0.0 || v.is_infinite() {
        return f64::NEG_INFINITY;
    }
    // f_IG(v) = f_Gamma(1/v) / v²
    norm - (alpha + 1.0) * v.ln() - beta / v
}

/// Log of the scaled Inverse-Chi-Squared PDF at v.
///
/// `ScaledInvChi2(ν, s²) = InvGamma(ν/2, ν s²/2)`.
pub fn scaled_inv_chi2_log_pdf(v: f64, nu: f64, s2: f64) -> f64 {
    if nu.is_nan() || s2.is_nan() || nu <= 0.0 || s2 <= 0.0 {
        return f64::NAN;
    }
    inv_gamma_log_pdf(v, nu / 2.0, nu * s2 / 2.0)
}

/// Mean of InvGamma(α, β), defined for α > 1.
///
/// E[V] = β / (α - 1)
pub fn inv_gamma_mean(alpha: f64, beta: f64) -> f64 {
    if alpha.is_nan() || beta.is_nan() || alpha <= 1.0 || beta <= 0.0 {
        return f64::NAN;
    }
    beta / (alpha - 1.0)
}

/// Variance of InvGamma(α, β), defined for α > 2.
///
/// Var[V] = β² / ((α - 1)² (α - 2))
pub fn inv_gamma_var(alpha: f64, beta: f64) -> f64 {
    if alpha.is_nan() || beta.is_nan() || alpha <= 2.0 || beta <= 0.0 {
        return f64::NAN;
    }
    beta * beta / ((alpha - 1.0).powi(2) * (alpha - 2.0))
}
