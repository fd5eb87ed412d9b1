//! Inverse-Gamma prior on the variance of a Gaussian with known mean.
//!
//! β is an inverse scale: σ² has density ∝ σ^(-2(α+1)) e^(-1/(βσ²)), so
//! E[σ²] = 1/(β(α-1)). Equivalently 1/σ² ~ Gamma(α) with scale β.

use dpmm_common::Result;
use dpmm_math::{inv_gamma_log_pdf, log_gamma, normal_log_pdf, student_t_log_pdf, LN_2PI};
use rand::Rng;

use super::{check_scalar_obs, check_variance, draw, require_finite, require_positive, ConjugatePrior};

const FAMILY: &str = "inverse_gamma";

#[derive(Debug, Clone, PartialEq)]
pub struct InverseGamma {
    alpha: f64,
    beta: f64,
    mu: f64,
}

impl InverseGamma {
    /// `mu` is the known observation mean.
    pub fn new(alpha: f64, beta: f64, mu: f64) -> Result<Self> {
        require_positive(FAMILY, "alpha", alpha)?;
        require_positive(FAMILY, "beta", beta)?;
        require_finite(FAMILY, "mu", mu)?;
        Ok(Self { alpha, beta, mu })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Conventional Inverse-Gamma scale, 1/β.
    pub fn scale(&self) -> f64 {
        self.beta.recip()
    }
}

impl ConjugatePrior for InverseGamma {
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
        draw::inv_gamma(rng, self.alpha, self.scale())
    }

    fn ln_density(&self, var: &f64) -> Result<f64> {
        check_variance(*var)?;
        Ok(inv_gamma_log_pdf(*var, self.alpha, self.scale()))
    }

    fn ln_likelihood_of_one(&self, var: &f64, x: &f64) -> Result<f64> {
        check_variance(*var)?;
        check_scalar_obs(*x)?;
        Ok(normal_log_pdf(*x, self.mu, *var))
    }

    fn posterior(&self, data: &[f64]) -> Result<Self> {
        for x in data {
            check_scalar_obs(*x)?;
        }
        let ss: f64 = data.iter().map(|x| (x - self.mu) * (x - self.mu)).sum();
        Ok(Self {
            alpha: self.alpha + 0.5 * data.len() as f64,
            beta: (self.scale() + 0.5 * ss).recip(),
            mu: self.mu,
        })
    }

    fn ln_predictive(&self, x: &f64) -> Result<f64> {
        check_scalar_obs(*x)?;
        Ok(student_t_log_pdf(
            *x,
            self.mu,
            2.0 * self.alpha,
            self.scale() / self.alpha,
        ))
    }

    fn ln_evidence(&self, data: &[f64]) -> Result<f64> {
        if data.is_empty() {
            return Ok(0.0);
        }
        let post = self.posterior(data)?;
        let n = data.len() as f64;
        // ln s^α with s = 1/β
        Ok(log_gamma(post.alpha) - log_gamma(self.alpha) - self.alpha * self.beta.ln()
            + post.alpha * post.beta.ln()
            - 0.5 * n * LN_2PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posterior_update() {
        let p = InverseGamma::new(1.1, 1.2, 0.1).unwrap();
        let post = p.posterior(&[1.0, 2.0, 3.0]).unwrap();
        // Σ(x - 0.1)² = 0.81 + 3.61 + 8.41
        assert!((post.alpha() - 2.6).abs() < 1e-14);
        assert!((post.scale() - (1.0 / 1.2 + 0.5 * 12.83)).abs() < 1e-12);
        assert!((post.beta() * post.scale() - 1.0).abs() < 1e-15);
        assert_eq!(post.mu(), 0.1);
    }

    #[test]
    fn beta_is_an_inverse_scale() {
        use rand::SeedableRng;
        use rand_xoshiro::Xoshiro256PlusPlus;

        let p = InverseGamma::new(3.5, 2.0, 0.0).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
        let draws = p.sample_n(40_000, &mut rng).unwrap();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        // 1/(β(α-1)) = 0.2
        assert!((mean - 0.2).abs() < 0.01, "mean = {}", mean);
    }

    #[test]
    fn density_outside_support() {
        let p = InverseGamma::new(1.1, 1.2, 0.1).unwrap();
        assert!(p.ln_density(&0.0).is_err());
        assert!(p.ln_density(&-2.0).is_err());
        assert!(p.ln_likelihood_of_one(&f64::NAN, &1.0).is_err());
    }
}
