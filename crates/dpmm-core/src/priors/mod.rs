//! Conjugate prior/likelihood families.
//!
//! Every family implements [`ConjugatePrior`]: sampling, prior density,
//! likelihood, conjugate posterior update, posterior predictive and marginal
//! likelihood (evidence), all in closed form. Log-domain methods are primary;
//! the linear-domain variants exponentiate them.
//!
//! The families obey the usual conjugacy identities:
//!
//! ```text
//! posterior(D).density(θ) = density(θ) · likelihood(θ, D) / evidence(D)
//! evidence(D) = Π_i posterior(D[..i]).predictive(D[i])
//! ```
//!
//! Priors are immutable values; `posterior` returns a new instance.

pub mod draw;
pub mod family;
pub mod gaussian_known_variance;
pub mod inv_gamma;
pub mod inv_wishart;
pub mod nig;
pub mod niw;
pub mod nix;

pub use family::{ModelParameter, Observation, PriorFamily};
pub use gaussian_known_variance::GaussianKnownVariance;
pub use inv_gamma::InverseGamma;
pub use inv_wishart::InverseWishart;
pub use nig::NormalInverseGamma;
pub use niw::NormalInverseWishart;
pub use nix::NormalInverseChiSquared;

use dpmm_common::{Error, Result};
use dpmm_math::SpdFactor;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

/// Mean and variance of a univariate Gaussian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanVar {
    pub mean: f64,
    pub var: f64,
}

impl MeanVar {
    pub fn new(mean: f64, var: f64) -> Self {
        Self { mean, var }
    }
}

/// Mean vector and covariance matrix of a multivariate Gaussian.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanCov {
    pub mean: DVector<f64>,
    pub cov: DMatrix<f64>,
}

impl MeanCov {
    pub fn new(mean: DVector<f64>, cov: DMatrix<f64>) -> Self {
        Self { mean, cov }
    }
}

/// A conjugate prior over the parameters of a data-generating distribution.
pub trait ConjugatePrior: Clone + std::fmt::Debug {
    /// Parameter of the data-generating distribution.
    type Param: Clone + std::fmt::Debug;
    /// One observation.
    type Obs: Clone + std::fmt::Debug;

    /// Family tag, matching the configuration `family` field.
    fn family(&self) -> &'static str;

    /// Dimension of one observation.
    fn obs_dim(&self) -> usize;

    /// Dimension of `x` itself, compared against [`obs_dim`](Self::obs_dim)
    /// when data is first handed to a sampler.
    fn observation_dim(&self, _x: &Self::Obs) -> usize {
        self.obs_dim()
    }

    /// Check that `x` is finite and has the right dimension.
    fn check_observation(&self, x: &Self::Obs) -> Result<()>;

    /// Draw one parameter from this distribution.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self::Param>;

    /// Draw `n` independent parameters.
    fn sample_n<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<Self::Param>> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// Log density of `theta` under this distribution.
    fn ln_density(&self, theta: &Self::Param) -> Result<f64>;

    fn density(&self, theta: &Self::Param) -> Result<f64> {
        Ok(self.ln_density(theta)?.exp())
    }

    /// Log density of one observation given `theta`.
    fn ln_likelihood_of_one(&self, theta: &Self::Param, x: &Self::Obs) -> Result<f64>;

    fn likelihood_of_one(&self, theta: &Self::Param, x: &Self::Obs) -> Result<f64> {
        Ok(self.ln_likelihood_of_one(theta, x)?.exp())
    }

    /// Log joint density of i.i.d. observations given `theta`.
    fn ln_likelihood(&self, theta: &Self::Param, data: &[Self::Obs]) -> Result<f64> {
        let mut total = 0.0;
        for x in data {
            total += self.ln_likelihood_of_one(theta, x)?;
        }
        Ok(total)
    }

    fn likelihood(&self, theta: &Self::Param, data: &[Self::Obs]) -> Result<f64> {
        Ok(self.ln_likelihood(theta, data)?.exp())
    }

    /// Conjugate update on `data`. Empty data returns an equal prior.
    fn posterior(&self, data: &[Self::Obs]) -> Result<Self>;

    /// Log posterior-predictive density of a new observation.
    fn ln_predictive(&self, x: &Self::Obs) -> Result<f64>;

    fn predictive(&self, x: &Self::Obs) -> Result<f64> {
        Ok(self.ln_predictive(x)?.exp())
    }

    /// Log marginal likelihood of `data`. Zero for empty data.
    fn ln_evidence(&self, data: &[Self::Obs]) -> Result<f64>;

    fn evidence(&self, data: &[Self::Obs]) -> Result<f64> {
        Ok(self.ln_evidence(data)?.exp())
    }
}

/// Marginal densities of one parameter block with the other integrated out.
pub trait MarginalQueries: ConjugatePrior {
    type Mean;
    type Scale;

    /// Log density of the location parameter, scale integrated out.
    fn ln_marginal_mean(&self, mean: &Self::Mean) -> Result<f64>;

    fn marginal_mean(&self, mean: &Self::Mean) -> Result<f64> {
        Ok(self.ln_marginal_mean(mean)?.exp())
    }

    /// Log density of the scale parameter, location integrated out.
    fn ln_marginal_scale(&self, scale: &Self::Scale) -> Result<f64>;

    fn marginal_scale(&self, scale: &Self::Scale) -> Result<f64> {
        Ok(self.ln_marginal_scale(scale)?.exp())
    }
}

// Hyperparameter checks shared by the families.

pub(crate) fn require_finite(family: &'static str, name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::hyperparameter(
            family,
            name,
            format!("must be finite, got {}", value),
        ));
    }
    Ok(())
}

pub(crate) fn require_positive(family: &'static str, name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::hyperparameter(
            family,
            name,
            format!("must be finite and > 0, got {}", value),
        ));
    }
    Ok(())
}

pub(crate) fn require_finite_vector(
    family: &'static str,
    name: &str,
    value: &DVector<f64>,
) -> Result<()> {
    if value.is_empty() {
        return Err(Error::hyperparameter(family, name, "must be non-empty"));
    }
    if value.iter().any(|v| !v.is_finite()) {
        return Err(Error::hyperparameter(family, name, "entries must be finite"));
    }
    Ok(())
}

/// Factorize a scale matrix of order `dim`.
pub(crate) fn require_spd(
    family: &'static str,
    name: &str,
    value: &DMatrix<f64>,
    dim: usize,
) -> Result<SpdFactor> {
    if value.nrows() != dim || value.ncols() != dim {
        return Err(Error::hyperparameter(
            family,
            name,
            format!(
                "expected {}x{} matrix, got {}x{}",
                dim,
                dim,
                value.nrows(),
                value.ncols()
            ),
        ));
    }
    SpdFactor::new(value).ok_or_else(|| {
        Error::hyperparameter(family, name, "must be symmetric positive definite")
    })
}

pub(crate) fn require_wishart_dof(family: &'static str, name: &str, nu: f64, dim: usize) -> Result<()> {
    let min = dim as f64 - 1.0;
    if !nu.is_finite() || nu <= min {
        return Err(Error::hyperparameter(
            family,
            name,
            format!("must be finite and > {} (dimension - 1), got {}", min, nu),
        ));
    }
    Ok(())
}

// Parameter and observation domain checks.

fn wrong_dimension(expected: usize, actual: usize) -> String {
    format!("expected dimension {}, got {}", expected, actual)
}

/// Largest accepted |x| for an observation entry. Beyond this, squared
/// deviations and sums of squares leave the range of `f64`.
pub const MAX_OBSERVATION_MAGNITUDE: f64 = 1e150;

pub(crate) fn check_scalar_obs(x: f64) -> Result<()> {
    if !x.is_finite() {
        return Err(Error::domain("x", format!("observation must be finite, got {}", x)));
    }
    if x.abs() > MAX_OBSERVATION_MAGNITUDE {
        return Err(Error::domain(
            "x",
            format!("|x| must be at most {:e}, got {:e}", MAX_OBSERVATION_MAGNITUDE, x),
        ));
    }
    Ok(())
}

pub(crate) fn check_vector_obs(x: &DVector<f64>, dim: usize) -> Result<()> {
    if x.len() != dim {
        return Err(Error::domain("x", wrong_dimension(dim, x.len())));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::domain("x", "observation entries must be finite"));
    }
    if x.iter().any(|v| v.abs() > MAX_OBSERVATION_MAGNITUDE) {
        return Err(Error::domain(
            "x",
            format!("entries must be at most {:e} in magnitude", MAX_OBSERVATION_MAGNITUDE),
        ));
    }
    Ok(())
}

pub(crate) fn check_mean(mean: f64) -> Result<()> {
    if !mean.is_finite() {
        return Err(Error::domain("mean", format!("must be finite, got {}", mean)));
    }
    Ok(())
}

pub(crate) fn check_variance(var: f64) -> Result<()> {
    if !var.is_finite() || var <= 0.0 {
        return Err(Error::domain(
            "var",
            format!("must be finite and > 0, got {}", var),
        ));
    }
    Ok(())
}

pub(crate) fn check_mean_vector(mean: &DVector<f64>, dim: usize) -> Result<()> {
    if mean.len() != dim {
        return Err(Error::domain("mean", wrong_dimension(dim, mean.len())));
    }
    if mean.iter().any(|v| !v.is_finite()) {
        return Err(Error::domain("mean", "entries must be finite"));
    }
    Ok(())
}

/// Factorize a covariance parameter, rejecting anything outside the SPD cone.
pub(crate) fn check_covariance(cov: &DMatrix<f64>, dim: usize) -> Result<SpdFactor> {
    if cov.nrows() != dim || cov.ncols() != dim {
        return Err(Error::domain(
            "cov",
            format!("expected {}x{} matrix, got {}x{}", dim, dim, cov.nrows(), cov.ncols()),
        ));
    }
    SpdFactor::new(cov).ok_or_else(|| {
        Error::domain("cov", "must be finite, symmetric and positive definite")
    })
}

/// Map a NaN produced by a density kernel to a domain error.
pub(crate) fn finite_or_domain(value: f64, parameter: &str) -> Result<f64> {
    if value.is_nan() {
        return Err(Error::domain(parameter, "density undefined at this point"));
    }
    Ok(value)
}

/// Sample mean and centered sum of squares of scalar data.
pub(crate) fn scalar_stats(data: &[f64]) -> (f64, f64) {
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let ss = data.iter().map(|x| (x - mean) * (x - mean)).sum();
    (mean, ss)
}

/// Sample mean and centered scatter matrix of vector data.
pub(crate) fn vector_stats(data: &[DVector<f64>], dim: usize) -> (DVector<f64>, DMatrix<f64>) {
    let n = data.len() as f64;
    let mut mean = DVector::zeros(dim);
    for x in data {
        mean += x;
    }
    mean /= n;
    let mut scatter = DMatrix::zeros(dim, dim);
    for x in data {
        let d = x - &mean;
        scatter += &d * d.transpose();
    }
    (mean, scatter)
}
