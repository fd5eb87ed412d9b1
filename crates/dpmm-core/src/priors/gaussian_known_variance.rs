//! Gaussian prior on the mean of a Gaussian with known variance.
//!
//! Prior: μ ~ N(μ0, τ0²). Likelihood: x | μ ~ N(μ, σ²) with σ² fixed.
//! Posterior after n points:
//!
//! ```text
//! 1/τn² = 1/τ0² + n/σ²
//! μn    = τn² (μ0/τ0² + Σx/σ²)
//! ```

use dpmm_common::Result;
use dpmm_math::{normal_log_pdf, LN_2PI};
use rand::Rng;

use super::{check_mean, check_scalar_obs, draw, require_finite, require_positive, scalar_stats};
use super::ConjugatePrior;

const FAMILY: &str = "gaussian_known_variance";

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKnownVariance {
    mu0: f64,
    prior_var: f64,
    known_var: f64,
}

impl GaussianKnownVariance {
    /// `prior_var` is τ0², `known_var` is the observation variance σ².
    pub fn new(mu0: f64, prior_var: f64, known_var: f64) -> Result<Self> {
        require_finite(FAMILY, "mu0", mu0)?;
        require_positive(FAMILY, "prior_var", prior_var)?;
        require_positive(FAMILY, "known_var", known_var)?;
        Ok(Self {
            mu0,
            prior_var,
            known_var,
        })
    }

    pub fn mu0(&self) -> f64 {
        self.mu0
    }

    pub fn prior_var(&self) -> f64 {
        self.prior_var
    }

    pub fn known_var(&self) -> f64 {
        self.known_var
    }
}

impl ConjugatePrior for GaussianKnownVariance {
    type Param = f64;
    type Obs = f64;

    fn family(&self) -> &'static str {
        FAMILY
    }

    fn obs_dim(&self) -> usize {
        1
    }

    fn check_observation(&self, x: &f64) -> Result<()> {
        check_scalar_obs(*x)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        Ok(draw::normal(rng, self.mu0, self.prior_var))
    }

    fn ln_density(&self, mu: &f64) -> Result<f64> {
        check_mean(*mu)?;
        Ok(normal_log_pdf(*mu, self.mu0, self.prior_var))
    }

    fn ln_likelihood_of_one(&self, mu: &f64, x: &f64) -> Result<f64> {
        check_mean(*mu)?;
        check_scalar_obs(*x)?;
        Ok(normal_log_pdf(*x, *mu, self.known_var))
    }

    fn posterior(&self, data: &[f64]) -> Result<Self> {
        for x in data {
            check_scalar_obs(*x)?;
        }
        if data.is_empty() {
            return Ok(self.clone());
        }
        let n = data.len() as f64;
        let sum: f64 = data.iter().sum();
        let prec = 1.0 / self.prior_var + n / self.known_var;
        let var_n = 1.0 / prec;
        let mu_n = var_n * (self.mu0 / self.prior_var + sum / self.known_var);
        Ok(Self {
            mu0: mu_n,
            prior_var: var_n,
            known_var: self.known_var,
        })
    }

    fn ln_predictive(&self, x: &f64) -> Result<f64> {
        check_scalar_obs(*x)?;
        Ok(normal_log_pdf(*x, self.mu0, self.prior_var + self.known_var))
    }

    /// D ~ N(μ0·1, σ²I + τ0²11ᵀ), evaluated through its sufficient statistics:
    ///
    /// ```text
    /// ln p(D) = -n/2 ln(2πσ²) - ½ ln(1 + nτ0²/σ²)
    ///           - ½ [SS/σ² + n(x̄ - μ0)²/(σ² + nτ0²)]
    /// ```
    fn ln_evidence(&self, data: &[f64]) -> Result<f64> {
        for x in data {
            check_scalar_obs(*x)?;
        }
        if data.is_empty() {
            return Ok(0.0);
        }
        let n = data.len() as f64;
        let (mean, ss) = scalar_stats(data);
        let s2 = self.known_var;
        let t2 = self.prior_var;
        let dev = mean - self.mu0;
        Ok(-0.5 * n * (LN_2PI + s2.ln())
            - 0.5 * (n * t2 / s2).ln_1p()
            - 0.5 * (ss / s2 + n * dev * dev / (s2 + n * t2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpmm_common::Error;

    fn prior() -> GaussianKnownVariance {
        GaussianKnownVariance::new(0.0, 1.0, 0.1).unwrap()
    }

    #[test]
    fn rejects_bad_hyperparameters() {
        assert!(matches!(
            GaussianKnownVariance::new(0.0, 0.0, 1.0),
            Err(Error::InvalidHyperparameter { .. })
        ));
        assert!(GaussianKnownVariance::new(f64::NAN, 1.0, 1.0).is_err());
        assert!(GaussianKnownVariance::new(0.0, 1.0, -0.1).is_err());
    }

    #[test]
    fn posterior_shrinks_toward_data() {
        let p = prior().posterior(&[1.0, 2.0, 3.0]).unwrap();
        // 1/τn² = 1 + 30 = 31, μn = (0 + 60) / 31
        assert!((p.prior_var() - 1.0 / 31.0).abs() < 1e-14);
        assert!((p.mu0() - 60.0 / 31.0).abs() < 1e-14);
        assert_eq!(p.known_var(), 0.1);
    }

    #[test]
    fn single_point_evidence_is_predictive() {
        let p = prior();
        let x = 0.7;
        let ev = p.ln_evidence(&[x]).unwrap();
        let pp = p.ln_predictive(&x).unwrap();
        assert!((ev - pp).abs() < 1e-12);
    }

    #[test]
    fn evidence_matches_sequential_predictive() {
        let p = GaussianKnownVariance::new(0.1, 2.0, 0.5).unwrap();
        let data = [1.0, -0.3, 2.2, 0.4];
        let mut seq = 0.0;
        for i in 0..data.len() {
            seq += p
                .posterior(&data[..i])
                .unwrap()
                .ln_predictive(&data[i])
                .unwrap();
        }
        assert!((seq - p.ln_evidence(&data).unwrap()).abs() < 1e-11);
    }

    #[test]
    fn rejects_non_finite_inputs() {
        let p = prior();
        assert!(matches!(
            p.ln_density(&f64::INFINITY),
            Err(Error::InvalidParameterDomain { .. })
        ));
        assert!(p.ln_predictive(&f64::NAN).is_err());
        assert!(p.posterior(&[1.0, f64::NAN]).is_err());
    }
}
