//! Prior family hyperparameters as they appear in configuration files.
//!
//! Matrices are written row-major as nested arrays.

use serde::{Deserialize, Serialize};

/// Family tags accepted in the `prior.family` field.
pub const KNOWN_FAMILIES: [&str; 6] = [
    "normal_inverse_wishart",
    "normal_inverse_gamma",
    "normal_inverse_chi_squared",
    "inverse_gamma",
    "inverse_wishart",
    "gaussian_known_variance",
];

/// Hyperparameters of one conjugate prior family, tagged by `family`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum PriorSpec {
    /// Normal-Inverse-Wishart over (mean vector, covariance).
    NormalInverseWishart {
        mu0: Vec<f64>,
        kappa0: f64,
        lambda0: Vec<Vec<f64>>,
        nu0: f64,
    },
    /// Normal-Inverse-Gamma over (mean, variance).
    NormalInverseGamma { m0: f64, v0: f64, a0: f64, b0: f64 },
    /// Normal-Inverse-Chi-Squared over (mean, variance).
    NormalInverseChiSquared {
        mu0: f64,
        kappa0: f64,
        sigma0_sq: f64,
        nu0: f64,
    },
    /// Inverse-Gamma over the variance of a Gaussian with known mean `mu`.
    /// `beta` is an inverse scale: E[σ²] = 1/(β(α-1)).
    InverseGamma { alpha: f64, beta: f64, mu: f64 },
    /// Inverse-Wishart over the covariance of a Gaussian with known mean `mu`.
    InverseWishart {
        nu: f64,
        psi: Vec<Vec<f64>>,
        mu: Vec<f64>,
    },
    /// Gaussian prior N(mu0, prior_var) over the mean of a Gaussian with
    /// known variance `known_var`.
    GaussianKnownVariance {
        mu0: f64,
        prior_var: f64,
        known_var: f64,
    },
}

impl PriorSpec {
    /// The `family` tag of this spec.
    pub fn family(&self) -> &'static str {
        match self {
            PriorSpec::NormalInverseWishart { .. } => "normal_inverse_wishart",
            PriorSpec::NormalInverseGamma { .. } => "normal_inverse_gamma",
            PriorSpec::NormalInverseChiSquared { .. } => "normal_inverse_chi_squared",
            PriorSpec::InverseGamma { .. } => "inverse_gamma",
            PriorSpec::InverseWishart { .. } => "inverse_wishart",
            PriorSpec::GaussianKnownVariance { .. } => "gaussian_known_variance",
        }
    }

    /// Dimension of one observation under this prior.
    pub fn obs_dim(&self) -> usize {
        match self {
            PriorSpec::NormalInverseWishart { mu0, .. } => mu0.len(),
            PriorSpec::InverseWishart { mu, .. } => mu.len(),
            _ => 1,
        }
    }

    /// Whether observations are vectors rather than scalars.
    pub fn is_multivariate(&self) -> bool {
        matches!(
            self,
            PriorSpec::NormalInverseWishart { .. } | PriorSpec::InverseWishart { .. }
        )
    }
}
