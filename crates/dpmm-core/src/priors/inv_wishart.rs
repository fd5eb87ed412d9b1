//! Inverse-Wishart prior on the covariance of a multivariate Gaussian with
//! known mean.

use dpmm_common::Result;
use dpmm_math::{inv_wishart_log_pdf, log_mv_gamma, mvn_log_pdf, mvt_log_pdf_scaled, symmetrize, SpdFactor, LN_PI};
use nalgebra::{DMatrix, DVector};
use rand::Rng;

use super::{
    check_covariance, check_vector_obs, draw, finite_or_domain, require_finite_vector, require_spd,
    require_wishart_dof, ConjugatePrior,
};

const FAMILY: &str = "inverse_wishart";

#[derive(Debug, Clone)]
pub struct InverseWishart {
    nu: f64,
    psi: DMatrix<f64>,
    psi_factor: SpdFactor,
    mu: DVector<f64>,
}

impl InverseWishart {
    /// IW(ν, Ψ) over the covariance of N(`mu`, Σ).
    pub fn new(nu: f64, psi: DMatrix<f64>, mu: DVector<f64>) -> Result<Self> {
        require_finite_vector(FAMILY, "mu", &mu)?;
        let psi_factor = require_spd(FAMILY, "psi", &psi, mu.len())?;
        require_wishart_dof(FAMILY, "nu", nu, mu.len())?;
        Ok(Self {
            nu,
            psi,
            psi_factor,
            mu,
        })
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn psi(&self) -> &DMatrix<f64> {
        &self.psi
    }

    pub fn mu(&self) -> &DVector<f64> {
        &self.mu
    }
}

impl PartialEq for InverseWishart {
    fn eq(&self, other: &Self) -> bool {
        self.nu == other.nu && self.psi == other.psi && self.mu == other.mu
    }
}

impl ConjugatePrior for InverseWishart {
    type Param = DMatrix<f64>;
    type Obs = DVector<f64>;

    fn family(&self) -> &'static str {
        FAMILY
    }

    fn obs_dim(&self) -> usize {
        self.mu.len()
    }

    fn observation_dim(&self, x: &DVector<f64>) -> usize {
        x.len()
    }

    fn check_observation(&self, x: &DVector<f64>) -> Result<()> {
        check_vector_obs(x, self.obs_dim())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DMatrix<f64>> {
        draw::inv_wishart(rng, self.nu, &self.psi_factor)
    }

    fn ln_density(&self, cov: &DMatrix<f64>) -> Result<f64> {
        let factor = check_covariance(cov, self.obs_dim())?;
        finite_or_domain(
            inv_wishart_log_pdf(&factor, self.nu, &self.psi, self.psi_factor.ln_det()),
            "cov",
        )
    }

    fn ln_likelihood_of_one(&self, cov: &DMatrix<f64>, x: &DVector<f64>) -> Result<f64> {
        let factor = check_covariance(cov, self.obs_dim())?;
        self.check_observation(x)?;
        Ok(mvn_log_pdf(x, &self.mu, &factor))
    }

    fn posterior(&self, data: &[DVector<f64>]) -> Result<Self> {
        let d = self.obs_dim();
        for x in data {
            check_vector_obs(x, d)?;
        }
        if data.is_empty() {
            return Ok(self.clone());
        }
        let mut psi = self.psi.clone();
        for x in data {
            let dev = x - &self.mu;
            psi += &dev * dev.transpose();
        }
        let psi = symmetrize(&psi);
        let psi_factor = require_spd(FAMILY, "psi", &psi, d)?;
        Ok(Self {
            nu: self.nu + data.len() as f64,
            psi,
            psi_factor,
            mu: self.mu.clone(),
        })
    }

    /// t_(ν-d+1)(μ, Ψ/(ν-d+1)).
    fn ln_predictive(&self, x: &DVector<f64>) -> Result<f64> {
        self.check_observation(x)?;
        let df = self.nu - self.obs_dim() as f64 + 1.0;
        finite_or_domain(
            mvt_log_pdf_scaled(x, &self.mu, df, &self.psi_factor, 1.0 / df),
            "x",
        )
    }

    fn ln_evidence(&self, data: &[DVector<f64>]) -> Result<f64> {
        if data.is_empty() {
            return Ok(0.0);
        }
        let post = self.posterior(data)?;
        let d = self.obs_dim();
        let n = data.len() as f64;
        Ok(-0.5 * n * d as f64 * LN_PI + log_mv_gamma(d, 0.5 * post.nu)
            - log_mv_gamma(d, 0.5 * self.nu)
            + 0.5 * self.nu * self.psi_factor.ln_det()
            - 0.5 * post.nu * post.psi_factor.ln_det())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpmm_common::{Error, ErrorCategory};

    fn prior() -> InverseWishart {
        let psi = DMatrix::from_row_slice(2, 2, &[1.1, 0.1, 0.1, 1.1]);
        InverseWishart::new(3.0, psi, DVector::from_vec(vec![0.1, 0.2])).unwrap()
    }

    #[test]
    fn rejects_bad_hyperparameters() {
        let mu = DVector::from_vec(vec![0.0, 0.0]);
        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(matches!(
            InverseWishart::new(3.0, indefinite, mu.clone()),
            Err(Error::InvalidHyperparameter { .. })
        ));
        assert!(InverseWishart::new(1.0, DMatrix::identity(2, 2), mu.clone()).is_err());
        assert!(InverseWishart::new(3.0, DMatrix::identity(3, 3), mu).is_err());
    }

    #[test]
    fn posterior_adds_scatter_about_known_mean() {
        let p = prior();
        let x = DVector::from_vec(vec![1.1, 0.2]);
        let post = p.posterior(std::slice::from_ref(&x)).unwrap();
        assert_eq!(post.nu(), 4.0);
        assert!((post.psi()[(0, 0)] - 2.1).abs() < 1e-14);
        assert!((post.psi()[(0, 1)] - 0.1).abs() < 1e-14);
        assert!((post.psi()[(1, 1)] - 1.1).abs() < 1e-14);
    }

    #[test]
    fn covariance_outside_cone() {
        let p = prior();
        let bad = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]);
        assert!(matches!(
            p.ln_density(&bad),
            Err(Error::InvalidParameterDomain { .. })
        ));
        let x = DVector::from_vec(vec![0.0, 0.0, 0.0]);
        let err = p.ln_predictive(&x).unwrap_err();
        assert!(matches!(err, Error::InvalidParameterDomain { .. }));
        assert_eq!(err.category(), ErrorCategory::Domain);
    }

    #[test]
    fn single_point_evidence_is_predictive() {
        let p = prior();
        let x = DVector::from_vec(vec![0.4, -0.3]);
        let ev = p.ln_evidence(std::slice::from_ref(&x)).unwrap();
        assert!((ev - p.ln_predictive(&x).unwrap()).abs() < 1e-11);
    }
}
