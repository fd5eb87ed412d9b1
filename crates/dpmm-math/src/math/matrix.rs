//! Multivariate log densities over symmetric positive-definite matrices.
//!
//! Every density here takes a pre-factorized [`SpdFactor`] so callers pay for
//! the Cholesky decomposition once per covariance/scale matrix. Invalid
//! shapes return NaN, matching the scalar kernels in this crate.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

use super::stable::{log_gamma, log_mv_gamma, LN_2PI, LN_PI};

/// Relative tolerance used when checking matrix symmetry.
pub const SYMMETRY_TOL: f64 = 1e-9;

/// Cholesky factor of a symmetric positive-definite matrix with its cached
/// log-determinant.
#[derive(Debug, Clone)]
pub struct SpdFactor {
    chol: Cholesky<f64, Dyn>,
    ln_det: f64,
}

impl SpdFactor {
    /// Factorize `m`.
    ///
    /// Returns `None` if `m` is empty, non-square, non-finite, asymmetric, or
    /// not positive definite.
    pub fn new(m: &DMatrix<f64>) -> Option<Self> {
        if m.nrows() == 0 || !m.is_square() {
            return None;
        }
        if m.iter().any(|v| !v.is_finite()) {
            return None;
        }
        if !is_symmetric(m, SYMMETRY_TOL) {
            return None;
        }
        let chol = m.clone().cholesky()?;
        let ln_det = 2.0 * chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>();
        if !ln_det.is_finite() {
            return None;
        }
        Some(Self { chol, ln_det })
    }

    /// Matrix order.
    pub fn dim(&self) -> usize {
        self.chol.l_dirty().nrows()
    }

    /// ln |A|.
    pub fn ln_det(&self) -> f64 {
        self.ln_det
    }

    /// xᵀ A⁻¹ x.
    pub fn quad_form(&self, x: &DVector<f64>) -> f64 {
        let sol = self.chol.solve(x);
        x.dot(&sol)
    }

    /// tr(A⁻¹ M).
    pub fn trace_solve(&self, m: &DMatrix<f64>) -> f64 {
        self.chol.solve(m).trace()
    }

    /// Lower-triangular L with A = L Lᵀ.
    pub fn lower(&self) -> DMatrix<f64> {
        self.chol.l()
    }
}

/// Check symmetry of a square matrix within a relative tolerance.
pub fn is_symmetric(m: &DMatrix<f64>, tol: f64) -> bool {
    if !m.is_square() {
        return false;
    }
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let a = m[(i, j)];
            let b = m[(j, i)];
            let scale = 1.0_f64.max(a.abs()).max(b.abs());
            if (a - b).abs() > tol * scale {
                return false;
            }
        }
    }
    true
}

/// (M + Mᵀ) / 2, used to scrub rounding asymmetry after rank-one updates.
pub fn symmetrize(m: &DMatrix<f64>) -> DMatrix<f64> {
    (m + m.transpose()) * 0.5
}

/// Log of the multivariate Gaussian PDF N(x | mean, Σ).
pub fn mvn_log_pdf(x: &DVector<f64>, mean: &DVector<f64>, cov: &SpdFactor) -> f64 {
    let d = cov.dim();
    if x.len() != d || mean.len() != d {
        return f64::NAN;
    }
    let diff = x - mean;
    -0.5 * (d as f64 * LN_2PI + cov.ln_det() + cov.quad_form(&diff))
}

/// Log of the multivariate Student-t PDF t_ν(x | loc, Σ).
///
/// f(x) = Γ((ν+d)/2) / (Γ(ν/2) (νπ)^(d/2) |Σ|^(1/2)) · (1 + δᵀΣ⁻¹δ/ν)^(-(ν+d)/2)
pub fn mvt_log_pdf(x: &DVector<f64>, loc: &DVector<f64>, df: f64, scale: &SpdFactor) -> f64 {
    mvt_log_pdf_scaled(x, loc, df, scale, 1.0)
}

/// [`mvt_log_pdf`] with scale matrix `factor · A`, reusing the factorization
/// of `A`.
pub fn mvt_log_pdf_scaled(
    x: &DVector<f64>,
    loc: &DVector<f64>,
    df: f64,
    base: &SpdFactor,
    factor: f64,
) -> f64 {
    let d = base.dim();
    if x.len() != d || loc.len() != d || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if factor.is_nan() || factor <= 0.0 || factor.is_infinite() {
        return f64::NAN;
    }
    let p = d as f64;
    let diff = x - loc;
    let q = base.quad_form(&diff) / factor;
    let ln_det = base.ln_det() + p * factor.ln();
    log_gamma(0.5 * (df + p)) - log_gamma(0.5 * df) - 0.5 * p * (df.ln() + LN_PI)
        - 0.5 * ln_det
        - 0.5 * (df + p) * (q / df).ln_1p()
}

/// Log of the Inverse-Wishart PDF IW(Σ | ν, Ψ).
///
/// f(Σ) = |Ψ|^(ν/2) / (2^(νd/2) Γ_d(ν/2)) · |Σ|^(-(ν+d+1)/2) · exp(-tr(ΨΣ⁻¹)/2)
pub fn inv_wishart_log_pdf(sigma: &SpdFactor, df: f64, psi: &DMatrix<f64>, psi_ln_det: f64) -> f64 {
    let d = sigma.dim();
    if psi.nrows() != d || psi.ncols() != d || df.is_nan() || df <= d as f64 - 1.0 {
        return f64::NAN;
    }
    let p = d as f64;
    0.5 * df * psi_ln_det
        - 0.5 * df * p * std::f64::consts::LN_2
        - log_mv_gamma(d, 0.5 * df)
        - 0.5 * (df + p + 1.0) * sigma.ln_det()
        - 0.5 * sigma.trace_solve(psi)
}
