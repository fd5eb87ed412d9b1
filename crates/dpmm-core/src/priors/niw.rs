//! Normal-Inverse-Wishart prior on the mean and covariance of a
//! multivariate Gaussian.
//!
//! ```text
//! Σ     ~ IW(ν0, Λ0)
//! μ | Σ ~ N(μ0, Σ/κ0)
//! ```

use dpmm_common::Result;
use dpmm_math::{
    inv_wishart_log_pdf, log_mv_gamma, mvn_log_pdf, mvt_log_pdf_scaled, symmetrize, SpdFactor,
    LN_2PI, LN_PI,
};
use nalgebra::{DMatrix, DVector};
use rand::Rng;

use super::{
    check_covariance, check_mean_vector, check_vector_obs, draw, finite_or_domain,
    require_finite_vector, require_positive, require_spd, require_wishart_dof, vector_stats,
    ConjugatePrior, MarginalQueries, MeanCov,
};

const FAMILY: &str = "normal_inverse_wishart";

#[derive(Debug, Clone)]
pub struct NormalInverseWishart {
    mu0: DVector<f64>,
    kappa0: f64,
    lambda0: DMatrix<f64>,
    lambda_factor: SpdFactor,
    nu0: f64,
}

impl NormalInverseWishart {
    pub fn new(mu0: DVector<f64>, kappa0: f64, lambda0: DMatrix<f64>, nu0: f64) -> Result<Self> {
        require_finite_vector(FAMILY, "mu0", &mu0)?;
        require_positive(FAMILY, "kappa0", kappa0)?;
        let lambda_factor = require_spd(FAMILY, "lambda0", &lambda0, mu0.len())?;
        require_wishart_dof(FAMILY, "nu0", nu0, mu0.len())?;
        Ok(Self {
            mu0,
            kappa0,
            lambda0,
            lambda_factor,
            nu0,
        })
    }

    pub fn mu0(&self) -> &DVector<f64> {
        &self.mu0
    }

    pub fn kappa0(&self) -> f64 {
        self.kappa0
    }

    pub fn lambda0(&self) -> &DMatrix<f64> {
        &self.lambda0
    }

    pub fn nu0(&self) -> f64 {
        self.nu0
    }

    fn dim(&self) -> usize {
        self.mu0.len()
    }

    /// Degrees of freedom of the Student-t marginals, ν0 - d + 1.
    fn t_dof(&self) -> f64 {
        self.nu0 - self.dim() as f64 + 1.0
    }
}

impl PartialEq for NormalInverseWishart {
    fn eq(&self, other: &Self) -> bool {
        self.mu0 == other.mu0
            && self.kappa0 == other.kappa0
            && self.lambda0 == other.lambda0
            && self.nu0 == other.nu0
    }
}

impl ConjugatePrior for NormalInverseWishart {
    type Param = MeanCov;
    type Obs = DVector<f64>;

    fn family(&self) -> &'static str {
        FAMILY
    }

    fn obs_dim(&self) -> usize {
        self.dim()
    }

    fn observation_dim(&self, x: &DVector<f64>) -> usize {
        x.len()
    }

    fn check_observation(&self, x: &DVector<f64>) -> Result<()> {
        check_vector_obs(x, self.dim())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MeanCov> {
        let cov = draw::inv_wishart(rng, self.nu0, &self.lambda_factor)?;
        let lower = check_covariance(&cov, self.dim())?.lower() / self.kappa0.sqrt();
        let mean = draw::mvn(rng, &self.mu0, &lower);
        Ok(MeanCov { mean, cov })
    }

    /// IW(Σ | ν0, Λ0) · N(μ | μ0, Σ/κ0).
    fn ln_density(&self, theta: &MeanCov) -> Result<f64> {
        let d = self.dim();
        check_mean_vector(&theta.mean, d)?;
        let factor = check_covariance(&theta.cov, d)?;
        let ln_iw = finite_or_domain(
            inv_wishart_log_pdf(&factor, self.nu0, &self.lambda0, self.lambda_factor.ln_det()),
            "cov",
        )?;
        // N(μ0, Σ/κ0): |Σ/κ0| = |Σ| κ0^-d, quadratic form scales by κ0.
        let p = d as f64;
        let dev = &theta.mean - &self.mu0;
        let ln_normal = -0.5
            * (p * LN_2PI + factor.ln_det() - p * self.kappa0.ln()
                + self.kappa0 * factor.quad_form(&dev));
        Ok(ln_iw + ln_normal)
    }

    fn ln_likelihood_of_one(&self, theta: &MeanCov, x: &DVector<f64>) -> Result<f64> {
        let d = self.dim();
        check_mean_vector(&theta.mean, d)?;
        let factor = check_covariance(&theta.cov, d)?;
        self.check_observation(x)?;
        Ok(mvn_log_pdf(x, &theta.mean, &factor))
    }

    fn posterior(&self, data: &[DVector<f64>]) -> Result<Self> {
        let d = self.dim();
        for x in data {
            check_vector_obs(x, d)?;
        }
        if data.is_empty() {
            return Ok(self.clone());
        }
        let n = data.len() as f64;
        let (mean, scatter) = vector_stats(data, d);
        let kappa_n = self.kappa0 + n;
        let mu_n = (&self.mu0 * self.kappa0 + &mean * n) / kappa_n;
        let dev = &mean - &self.mu0;
        let lambda_n = symmetrize(
            &(&self.lambda0 + scatter + (&dev * dev.transpose()) * (self.kappa0 * n / kappa_n)),
        );
        let lambda_factor = require_spd(FAMILY, "lambda0", &lambda_n, d)?;
        Ok(Self {
            mu0: mu_n,
            kappa0: kappa_n,
            lambda0: lambda_n,
            lambda_factor,
            nu0: self.nu0 + n,
        })
    }

    /// t_(ν0-d+1)(μ0, Λ0 (κ0+1) / (κ0 (ν0-d+1))).
    fn ln_predictive(&self, x: &DVector<f64>) -> Result<f64> {
        self.check_observation(x)?;
        let df = self.t_dof();
        let factor = (self.kappa0 + 1.0) / (self.kappa0 * df);
        finite_or_domain(
            mvt_log_pdf_scaled(x, &self.mu0, df, &self.lambda_factor, factor),
            "x",
        )
    }

    fn ln_evidence(&self, data: &[DVector<f64>]) -> Result<f64> {
        if data.is_empty() {
            return Ok(0.0);
        }
        let post = self.posterior(data)?;
        let d = self.dim();
        let p = d as f64;
        let n = data.len() as f64;
        Ok(-0.5 * n * p * LN_PI + log_mv_gamma(d, 0.5 * post.nu0)
            - log_mv_gamma(d, 0.5 * self.nu0)
            + 0.5 * self.nu0 * self.lambda_factor.ln_det()
            - 0.5 * post.nu0 * post.lambda_factor.ln_det()
            + 0.5 * p * (self.kappa0 / post.kappa0).ln())
    }
}

impl MarginalQueries for NormalInverseWishart {
    type Mean = DVector<f64>;
    type Scale = DMatrix<f64>;

    /// μ ~ t_(ν0-d+1)(μ0, Λ0 / (κ0 (ν0-d+1))).
    fn ln_marginal_mean(&self, mean: &DVector<f64>) -> Result<f64> {
        check_mean_vector(mean, self.dim())?;
        let df = self.t_dof();
        finite_or_domain(
            mvt_log_pdf_scaled(mean, &self.mu0, df, &self.lambda_factor, 1.0 / (self.kappa0 * df)),
            "mean",
        )
    }

    /// Σ ~ IW(ν0, Λ0).
    fn ln_marginal_scale(&self, cov: &DMatrix<f64>) -> Result<f64> {
        let factor = check_covariance(cov, self.dim())?;
        finite_or_domain(
            inv_wishart_log_pdf(&factor, self.nu0, &self.lambda0, self.lambda_factor.ln_det()),
            "cov",
        )
    }
}
