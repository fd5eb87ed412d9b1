//! Normal-Inverse-Chi-Squared prior on the mean and variance of a Gaussian.
//!
//! ```text
//! σ²     ~ Scaled-Inv-χ²(ν0, σ0²)
//! μ | σ² ~ N(μ0, σ²/κ0)
//! ```
//!
//! Equivalent to [`NormalInverseGamma`] under m0 = μ0, V0 = 1/κ0,
//! a0 = ν0/2, b0 = ν0σ0²/2.

use dpmm_common::Result;
use dpmm_math::{log_gamma, normal_log_pdf, scaled_inv_chi2_log_pdf, student_t_log_pdf, LN_PI};
use rand::Rng;

use super::nig::NormalInverseGamma;
use super::{
    check_mean, check_scalar_obs, check_variance, draw, require_finite, require_positive,
    scalar_stats, ConjugatePrior, MarginalQueries, MeanVar,
};

const FAMILY: &str = "normal_inverse_chi_squared";

#[derive(Debug, Clone, PartialEq)]
pub struct NormalInverseChiSquared {
    mu0: f64,
    kappa0: f64,
    sigma0_sq: f64,
    nu0: f64,
}

impl NormalInverseChiSquared {
    pub fn new(mu0: f64, kappa0: f64, sigma0_sq: f64, nu0: f64) -> Result<Self> {
        require_finite(FAMILY, "mu0", mu0)?;
        require_positive(FAMILY, "kappa0", kappa0)?;
        require_positive(FAMILY, "sigma0_sq", sigma0_sq)?;
        require_positive(FAMILY, "nu0", nu0)?;
        Ok(Self {
            mu0,
            kappa0,
            sigma0_sq,
            nu0,
        })
    }

    pub fn mu0(&self) -> f64 {
        self.mu0
    }

    pub fn kappa0(&self) -> f64 {
        self.kappa0
    }

    pub fn sigma0_sq(&self) -> f64 {
        self.sigma0_sq
    }

    pub fn nu0(&self) -> f64 {
        self.nu0
    }

    /// The same distribution in Normal-Inverse-Gamma form.
    pub fn to_nig(&self) -> Result<NormalInverseGamma> {
        NormalInverseGamma::new(
            self.mu0,
            1.0 / self.kappa0,
            0.5 * self.nu0,
            0.5 * self.nu0 * self.sigma0_sq,
        )
    }

    fn check_param(theta: &MeanVar) -> Result<()> {
        check_mean(theta.mean)?;
        check_variance(theta.var)
    }
}

impl ConjugatePrior for NormalInverseChiSquared {
    type Param = MeanVar;
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

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MeanVar> {
        let var = draw::inv_gamma(rng, 0.5 * self.nu0, 0.5 * self.nu0 * self.sigma0_sq)?;
        let mean = draw::normal(rng, self.mu0, var / self.kappa0);
        Ok(MeanVar { mean, var })
    }

    fn ln_density(&self, theta: &MeanVar) -> Result<f64> {
        Self::check_param(theta)?;
        Ok(scaled_inv_chi2_log_pdf(theta.var, self.nu0, self.sigma0_sq)
            + normal_log_pdf(theta.mean, self.mu0, theta.var / self.kappa0))
    }

    fn ln_likelihood_of_one(&self, theta: &MeanVar, x: &f64) -> Result<f64> {
        Self::check_param(theta)?;
        check_scalar_obs(*x)?;
        Ok(normal_log_pdf(*x, theta.mean, theta.var))
    }

    fn posterior(&self, data: &[f64]) -> Result<Self> {
        for x in data {
            check_scalar_obs(*x)?;
        }
        if data.is_empty() {
            return Ok(self.clone());
        }
        let n = data.len() as f64;
        let (mean, ss) = scalar_stats(data);
        let kappa_n = self.kappa0 + n;
        let nu_n = self.nu0 + n;
        let mu_n = (self.kappa0 * self.mu0 + n * mean) / kappa_n;
        let dev = self.mu0 - mean;
        let nu_sigma_n = self.nu0 * self.sigma0_sq + ss + n * self.kappa0 / kappa_n * dev * dev;
        Ok(Self {
            mu0: mu_n,
            kappa0: kappa_n,
            sigma0_sq: nu_sigma_n / nu_n,
            nu0: nu_n,
        })
    }

    fn ln_predictive(&self, x: &f64) -> Result<f64> {
        check_scalar_obs(*x)?;
        let scale2 = self.sigma0_sq * (self.kappa0 + 1.0) / self.kappa0;
        Ok(student_t_log_pdf(*x, self.mu0, self.nu0, scale2))
    }

    fn ln_evidence(&self, data: &[f64]) -> Result<f64> {
        if data.is_empty() {
            return Ok(0.0);
        }
        let post = self.posterior(data)?;
        let n = data.len() as f64;
        Ok(log_gamma(0.5 * post.nu0) - log_gamma(0.5 * self.nu0)
            + 0.5 * (self.kappa0 / post.kappa0).ln()
            + 0.5 * self.nu0 * (self.nu0 * self.sigma0_sq).ln()
            - 0.5 * post.nu0 * (post.nu0 * post.sigma0_sq).ln()
            - 0.5 * n * LN_PI)
    }
}

impl MarginalQueries for NormalInverseChiSquared {
    type Mean = f64;
    type Scale = f64;

    /// μ ~ t_ν0(μ0, σ0²/κ0).
    fn ln_marginal_mean(&self, mean: &f64) -> Result<f64> {
        check_mean(*mean)?;
        Ok(student_t_log_pdf(
            *mean,
            self.mu0,
            self.nu0,
            self.sigma0_sq / self.kappa0,
        ))
    }

    /// σ² ~ Scaled-Inv-χ²(ν0, σ0²).
    fn ln_marginal_scale(&self, var: &f64) -> Result<f64> {
        check_variance(*var)?;
        Ok(scaled_inv_chi2_log_pdf(*var, self.nu0, self.sigma0_sq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpmm_common::Error;

    fn prior() -> NormalInverseChiSquared {
        NormalInverseChiSquared::new(-0.1, 2.0, 1.1, 3.0).unwrap()
    }

    #[test]
    fn posterior_hyperparameters() {
        let p = prior().posterior(&[1.0, 2.0, 3.0]).unwrap();
        // κn = 5, νn = 6, μn = (2·-0.1 + 3·2) / 5
        assert!((p.kappa0() - 5.0).abs() < 1e-14);
        assert!((p.nu0() - 6.0).abs() < 1e-14);
        assert!((p.mu0() - 5.8 / 5.0).abs() < 1e-14);
        // νnσn² = 3.3 + 2 + (3·2/5)(2.1)²
        let expected = (3.3 + 2.0 + 1.2 * 2.1 * 2.1) / 6.0;
        assert!((p.sigma0_sq() - expected).abs() < 1e-12);
    }

    #[test]
    fn posterior_of_nothing_is_prior() {
        let p = prior();
        assert_eq!(p.posterior(&[]).unwrap(), p);
        assert_eq!(p.ln_evidence(&[]).unwrap(), 0.0);
    }

    #[test]
    fn rejects_out_of_support_parameters() {
        let p = prior();
        assert!(matches!(
            p.ln_density(&MeanVar::new(0.0, -1.0)),
            Err(Error::InvalidParameterDomain { .. })
        ));
        assert!(p.ln_likelihood_of_one(&MeanVar::new(0.0, 0.0), &1.0).is_err());
        assert!(p.ln_marginal_scale(&0.0).is_err());
    }

    #[test]
    fn rejects_bad_hyperparameters() {
        assert!(NormalInverseChiSquared::new(0.0, 0.0, 1.0, 1.0).is_err());
        assert!(NormalInverseChiSquared::new(0.0, 1.0, 1.0, -2.0).is_err());
    }
}
