//! Normal-Inverse-Gamma prior on the mean and variance of a Gaussian.
//!
//! ```text
//! σ²     ~ InvGamma(a0, b0)
//! μ | σ² ~ N(m0, σ² V0)
//! ```

use dpmm_common::Result;
use dpmm_math::{inv_gamma_log_pdf, log_gamma, normal_log_pdf, student_t_log_pdf, LN_2PI};
use rand::Rng;

use super::nix::NormalInverseChiSquared;
use super::{
    check_mean, check_scalar_obs, check_variance, draw, require_finite, require_positive,
    scalar_stats, ConjugatePrior, MarginalQueries, MeanVar,
};

const FAMILY: &str = "normal_inverse_gamma";

#[derive(Debug, Clone, PartialEq)]
pub struct NormalInverseGamma {
    m0: f64,
    v0: f64,
    a0: f64,
    b0: f64,
}

impl NormalInverseGamma {
    /// `b0` is the Inverse-Gamma scale.
    pub fn new(m0: f64, v0: f64, a0: f64, b0: f64) -> Result<Self> {
        require_finite(FAMILY, "m0", m0)?;
        require_positive(FAMILY, "v0", v0)?;
        require_positive(FAMILY, "a0", a0)?;
        require_positive(FAMILY, "b0", b0)?;
        Ok(Self { m0, v0, a0, b0 })
    }

    pub fn m0(&self) -> f64 {
        self.m0
    }

    pub fn v0(&self) -> f64 {
        self.v0
    }

    pub fn a0(&self) -> f64 {
        self.a0
    }

    pub fn b0(&self) -> f64 {
        self.b0
    }

    /// The same distribution in Normal-Inverse-Chi-Squared form.
    pub fn to_nix(&self) -> Result<NormalInverseChiSquared> {
        NormalInverseChiSquared::new(
            self.m0,
            1.0 / self.v0,
            self.b0 / self.a0,
            2.0 * self.a0,
        )
    }

    fn check_param(theta: &MeanVar) -> Result<()> {
        check_mean(theta.mean)?;
        check_variance(theta.var)
    }
}

impl ConjugatePrior for NormalInverseGamma {
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
        let var = draw::inv_gamma(rng, self.a0, self.b0)?;
        let mean = draw::normal(rng, self.m0, var * self.v0);
        Ok(MeanVar { mean, var })
    }

    fn ln_density(&self, theta: &MeanVar) -> Result<f64> {
        Self::check_param(theta)?;
        Ok(inv_gamma_log_pdf(theta.var, self.a0, self.b0)
            + normal_log_pdf(theta.mean, self.m0, theta.var * self.v0))
    }

    fn ln_likelihood_of_one(&self, theta: &MeanVar, x: &f64) -> Result<f64> {
        Self::check_param(theta)?;
        check_scalar_obs(*x)?;
        Ok(normal_log_pdf(*x, theta.mean, theta.var))
    }

    /// bn uses the centered form b0 + ½[SS + n(x̄ - m0)²/(1 + nV0)], which
    /// equals b0 + ½(m0²/V0 + Σx² - mn²/Vn) without the cancellation.
    fn posterior(&self, data: &[f64]) -> Result<Self> {
        for x in data {
            check_scalar_obs(*x)?;
        }
        if data.is_empty() {
            return Ok(self.clone());
        }
        let n = data.len() as f64;
        let (mean, ss) = scalar_stats(data);
        let v_n = 1.0 / (1.0 / self.v0 + n);
        let m_n = v_n * (self.m0 / self.v0 + n * mean);
        let dev = mean - self.m0;
        Ok(Self {
            m0: m_n,
            v0: v_n,
            a0: self.a0 + 0.5 * n,
            b0: self.b0 + 0.5 * (ss + n * dev * dev / (1.0 + n * self.v0)),
        })
    }

    fn ln_predictive(&self, x: &f64) -> Result<f64> {
        check_scalar_obs(*x)?;
        let scale2 = self.b0 * (1.0 + self.v0) / self.a0;
        Ok(student_t_log_pdf(*x, self.m0, 2.0 * self.a0, scale2))
    }

    fn ln_evidence(&self, data: &[f64]) -> Result<f64> {
        if data.is_empty() {
            return Ok(0.0);
        }
        let post = self.posterior(data)?;
        let n = data.len() as f64;
        Ok(log_gamma(post.a0) - log_gamma(self.a0)
            + 0.5 * (post.v0 / self.v0).ln()
            + self.a0 * self.b0.ln()
            - post.a0 * post.b0.ln()
            - 0.5 * n * LN_2PI)
    }
}

impl MarginalQueries for NormalInverseGamma {
    type Mean = f64;
    type Scale = f64;

    /// μ ~ t_2a0(m0, b0V0/a0).
    fn ln_marginal_mean(&self, mean: &f64) -> Result<f64> {
        check_mean(*mean)?;
        Ok(student_t_log_pdf(
            *mean,
            self.m0,
            2.0 * self.a0,
            self.b0 * self.v0 / self.a0,
        ))
    }

    /// σ² ~ InvGamma(a0, b0).
    fn ln_marginal_scale(&self, var: &f64) -> Result<f64> {
        check_variance(*var)?;
        Ok(inv_gamma_log_pdf(*var, self.a0, self.b0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior() -> NormalInverseGamma {
        NormalInverseGamma::new(-0.1, 1.1, 2.0, 3.0).unwrap()
    }

    #[test]
    fn centered_update_matches_textbook_form() {
        let p = prior();
        let data = [1.0, 2.0, 3.0];
        let post = p.posterior(&data).unwrap();

        let n = 3.0;
        let sum: f64 = data.iter().sum();
        let sum_sq: f64 = data.iter().map(|x| x * x).sum();
        let v_n = 1.0 / (1.0 / 1.1 + n);
        let m_n = v_n * (-0.1 / 1.1 + sum);
        let b_n = 3.0 + 0.5 * (0.01 / 1.1 + sum_sq - m_n * m_n / v_n);

        assert!((post.v0() - v_n).abs() < 1e-14);
        assert!((post.m0() - m_n).abs() < 1e-14);
        assert!((post.a0() - 3.5).abs() < 1e-14);
        assert!((post.b0() - b_n).abs() < 1e-12);
    }

    #[test]
    fn nix_round_trip() {
        let p = prior();
        let back = p.to_nix().unwrap().to_nig().unwrap();
        assert!((back.m0() - p.m0()).abs() < 1e-15);
        assert!((back.v0() - p.v0()).abs() < 1e-15);
        assert!((back.a0() - p.a0()).abs() < 1e-15);
        assert!((back.b0() - p.b0()).abs() < 1e-14);
    }

    #[test]
    fn evidence_is_permutation_invariant() {
        let p = prior();
        let a = p.ln_evidence(&[1.0, 2.0, 3.0, 2.2]).unwrap();
        let b = p.ln_evidence(&[2.2, 3.0, 1.0, 2.0]).unwrap();
        assert!((a - b).abs() < 1e-12);
    }
}
