//! Closed set of prior families with dynamically typed observations and
//! parameters, built from configuration.

use dpmm_common::{Error, Result};
use dpmm_config::PriorSpec;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

use super::{
    ConjugatePrior, GaussianKnownVariance, InverseGamma, InverseWishart, MarginalQueries, MeanCov,
    MeanVar, NormalInverseChiSquared, NormalInverseGamma, NormalInverseWishart,
};

/// One observation, scalar or vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Scalar(f64),
    Vector(DVector<f64>),
}

impl Observation {
    pub fn dim(&self) -> usize {
        match self {
            Observation::Scalar(_) => 1,
            Observation::Vector(v) => v.len(),
        }
    }

    fn as_scalar(&self) -> Result<f64> {
        match self {
            Observation::Scalar(x) => Ok(*x),
            Observation::Vector(v) if v.len() == 1 => Ok(v[0]),
            Observation::Vector(v) => Err(Error::domain(
                "x",
                format!("expected a scalar, got a vector of dimension {}", v.len()),
            )),
        }
    }

    fn to_vector(&self, dim: usize) -> Result<DVector<f64>> {
        match self {
            Observation::Vector(v) => Ok(v.clone()),
            Observation::Scalar(x) if dim == 1 => Ok(DVector::from_element(1, *x)),
            Observation::Scalar(_) => Err(Error::domain(
                "x",
                format!("expected a vector of dimension {}, got a scalar", dim),
            )),
        }
    }
}

impl From<f64> for Observation {
    fn from(x: f64) -> Self {
        Observation::Scalar(x)
    }
}

impl From<DVector<f64>> for Observation {
    fn from(x: DVector<f64>) -> Self {
        Observation::Vector(x)
    }
}

impl From<Vec<f64>> for Observation {
    fn from(x: Vec<f64>) -> Self {
        Observation::Vector(DVector::from_vec(x))
    }
}

/// A parameter of the data-generating distribution of some family.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelParameter {
    /// Gaussian mean (known variance).
    Mean(f64),
    /// Gaussian variance (known mean).
    Variance(f64),
    /// Gaussian mean and variance.
    MeanVar(MeanVar),
    /// Multivariate Gaussian mean vector, used by marginal queries.
    MeanVector(DVector<f64>),
    /// Multivariate Gaussian covariance (known mean).
    Covariance(DMatrix<f64>),
    /// Multivariate Gaussian mean and covariance.
    MeanCov(MeanCov),
}

impl ModelParameter {
    fn kind(&self) -> &'static str {
        match self {
            ModelParameter::Mean(_) => "mean",
            ModelParameter::Variance(_) => "variance",
            ModelParameter::MeanVar(_) => "mean_var",
            ModelParameter::MeanVector(_) => "mean_vector",
            ModelParameter::Covariance(_) => "covariance",
            ModelParameter::MeanCov(_) => "mean_cov",
        }
    }
}

fn wrong_param(family: &'static str, expected: &str, got: &ModelParameter) -> Error {
    Error::domain(
        "theta",
        format!("{} expects a {} parameter, got {}", family, expected, got.kind()),
    )
}

/// Every supported prior family.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorFamily {
    NormalInverseWishart(NormalInverseWishart),
    NormalInverseGamma(NormalInverseGamma),
    NormalInverseChiSquared(NormalInverseChiSquared),
    InverseGamma(InverseGamma),
    InverseWishart(InverseWishart),
    GaussianKnownVariance(GaussianKnownVariance),
}

impl PriorFamily {
    /// Build and validate a prior from its configuration.
    pub fn from_spec(spec: &PriorSpec) -> Result<Self> {
        Ok(match spec {
            PriorSpec::NormalInverseWishart {
                mu0,
                kappa0,
                lambda0,
                nu0,
            } => PriorFamily::NormalInverseWishart(NormalInverseWishart::new(
                DVector::from_column_slice(mu0),
                *kappa0,
                matrix_from_rows("normal_inverse_wishart", "lambda0", lambda0)?,
                *nu0,
            )?),
            PriorSpec::NormalInverseGamma { m0, v0, a0, b0 } => {
                PriorFamily::NormalInverseGamma(NormalInverseGamma::new(*m0, *v0, *a0, *b0)?)
            }
            PriorSpec::NormalInverseChiSquared {
                mu0,
                kappa0,
                sigma0_sq,
                nu0,
            } => PriorFamily::NormalInverseChiSquared(NormalInverseChiSquared::new(
                *mu0, *kappa0, *sigma0_sq, *nu0,
            )?),
            PriorSpec::InverseGamma { alpha, beta, mu } => {
                PriorFamily::InverseGamma(InverseGamma::new(*alpha, *beta, *mu)?)
            }
            PriorSpec::InverseWishart { nu, psi, mu } => {
                PriorFamily::InverseWishart(InverseWishart::new(
                    *nu,
                    matrix_from_rows("inverse_wishart", "psi", psi)?,
                    DVector::from_column_slice(mu),
                )?)
            }
            PriorSpec::GaussianKnownVariance {
                mu0,
                prior_var,
                known_var,
            } => PriorFamily::GaussianKnownVariance(GaussianKnownVariance::new(
                *mu0, *prior_var, *known_var,
            )?),
        })
    }
}

fn matrix_from_rows(family: &'static str, name: &str, rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |r| r.len());
    if nrows == 0 || rows.iter().any(|r| r.len() != ncols) {
        return Err(Error::hyperparameter(family, name, "rows must be non-empty and equal length"));
    }
    Ok(DMatrix::from_fn(nrows, ncols, |i, j| rows[i][j]))
}

fn scalars(data: &[Observation]) -> Result<Vec<f64>> {
    data.iter().map(Observation::as_scalar).collect()
}

fn vectors(data: &[Observation], dim: usize) -> Result<Vec<DVector<f64>>> {
    data.iter().map(|x| x.to_vector(dim)).collect()
}

/// Dispatch a scalar-observation family method.
macro_rules! with_scalar_family {
    ($self:expr, $p:ident => $body:expr, $vector:ident => $vbody:expr) => {
        match $self {
            PriorFamily::NormalInverseGamma($p) => $body,
            PriorFamily::NormalInverseChiSquared($p) => $body,
            PriorFamily::InverseGamma($p) => $body,
            PriorFamily::GaussianKnownVariance($p) => $body,
            PriorFamily::NormalInverseWishart($vector) => $vbody,
            PriorFamily::InverseWishart($vector) => $vbody,
        }
    };
}

impl ConjugatePrior for PriorFamily {
    type Param = ModelParameter;
    type Obs = Observation;

    fn family(&self) -> &'static str {
        with_scalar_family!(self, p => p.family(), v => v.family())
    }

    fn obs_dim(&self) -> usize {
        with_scalar_family!(self, p => p.obs_dim(), v => v.obs_dim())
    }

    fn observation_dim(&self, x: &Observation) -> usize {
        x.dim()
    }

    fn check_observation(&self, x: &Observation) -> Result<()> {
        with_scalar_family!(
            self,
            p => p.check_observation(&x.as_scalar()?),
            v => v.check_observation(&x.to_vector(v.obs_dim())?)
        )
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ModelParameter> {
        Ok(match self {
            PriorFamily::NormalInverseWishart(p) => ModelParameter::MeanCov(p.sample(rng)?),
            PriorFamily::NormalInverseGamma(p) => ModelParameter::MeanVar(p.sample(rng)?),
            PriorFamily::NormalInverseChiSquared(p) => ModelParameter::MeanVar(p.sample(rng)?),
            PriorFamily::InverseGamma(p) => ModelParameter::Variance(p.sample(rng)?),
            PriorFamily::InverseWishart(p) => ModelParameter::Covariance(p.sample(rng)?),
            PriorFamily::GaussianKnownVariance(p) => ModelParameter::Mean(p.sample(rng)?),
        })
    }

    fn ln_density(&self, theta: &ModelParameter) -> Result<f64> {
        match (self, theta) {
            (PriorFamily::NormalInverseWishart(p), ModelParameter::MeanCov(t)) => p.ln_density(t),
            (PriorFamily::NormalInverseGamma(p), ModelParameter::MeanVar(t)) => p.ln_density(t),
            (PriorFamily::NormalInverseChiSquared(p), ModelParameter::MeanVar(t)) => p.ln_density(t),
            (PriorFamily::InverseGamma(p), ModelParameter::Variance(t)) => p.ln_density(t),
            (PriorFamily::InverseWishart(p), ModelParameter::Covariance(t)) => p.ln_density(t),
            (PriorFamily::GaussianKnownVariance(p), ModelParameter::Mean(t)) => p.ln_density(t),
            (p, t) => Err(wrong_param(p.family(), expected_param(p), t)),
        }
    }

    fn ln_likelihood_of_one(&self, theta: &ModelParameter, x: &Observation) -> Result<f64> {
        match (self, theta) {
            (PriorFamily::NormalInverseWishart(p), ModelParameter::MeanCov(t)) => {
                p.ln_likelihood_of_one(t, &x.to_vector(p.obs_dim())?)
            }
            (PriorFamily::NormalInverseGamma(p), ModelParameter::MeanVar(t)) => {
                p.ln_likelihood_of_one(t, &x.as_scalar()?)
            }
            (PriorFamily::NormalInverseChiSquared(p), ModelParameter::MeanVar(t)) => {
                p.ln_likelihood_of_one(t, &x.as_scalar()?)
            }
            (PriorFamily::InverseGamma(p), ModelParameter::Variance(t)) => {
                p.ln_likelihood_of_one(t, &x.as_scalar()?)
            }
            (PriorFamily::InverseWishart(p), ModelParameter::Covariance(t)) => {
                p.ln_likelihood_of_one(t, &x.to_vector(p.obs_dim())?)
            }
            (PriorFamily::GaussianKnownVariance(p), ModelParameter::Mean(t)) => {
                p.ln_likelihood_of_one(t, &x.as_scalar()?)
            }
            (p, t) => Err(wrong_param(p.family(), expected_param(p), t)),
        }
    }

    fn posterior(&self, data: &[Observation]) -> Result<Self> {
        Ok(match self {
            PriorFamily::NormalInverseWishart(p) => {
                PriorFamily::NormalInverseWishart(p.posterior(&vectors(data, p.obs_dim())?)?)
            }
            PriorFamily::NormalInverseGamma(p) => {
                PriorFamily::NormalInverseGamma(p.posterior(&scalars(data)?)?)
            }
            PriorFamily::NormalInverseChiSquared(p) => {
                PriorFamily::NormalInverseChiSquared(p.posterior(&scalars(data)?)?)
            }
            PriorFamily::InverseGamma(p) => PriorFamily::InverseGamma(p.posterior(&scalars(data)?)?),
            PriorFamily::InverseWishart(p) => {
                PriorFamily::InverseWishart(p.posterior(&vectors(data, p.obs_dim())?)?)
            }
            PriorFamily::GaussianKnownVariance(p) => {
                PriorFamily::GaussianKnownVariance(p.posterior(&scalars(data)?)?)
            }
        })
    }

    fn ln_predictive(&self, x: &Observation) -> Result<f64> {
        with_scalar_family!(
            self,
            p => p.ln_predictive(&x.as_scalar()?),
            v => v.ln_predictive(&x.to_vector(v.obs_dim())?)
        )
    }

    fn ln_evidence(&self, data: &[Observation]) -> Result<f64> {
        with_scalar_family!(
            self,
            p => p.ln_evidence(&scalars(data)?),
            v => v.ln_evidence(&vectors(data, v.obs_dim())?)
        )
    }
}

fn expected_param(p: &PriorFamily) -> &'static str {
    match p {
        PriorFamily::NormalInverseWishart(_) => "mean_cov",
        PriorFamily::NormalInverseGamma(_) | PriorFamily::NormalInverseChiSquared(_) => "mean_var",
        PriorFamily::InverseGamma(_) => "variance",
        PriorFamily::InverseWishart(_) => "covariance",
        PriorFamily::GaussianKnownVariance(_) => "mean",
    }
}

fn no_marginals(family: &'static str) -> Error {
    Error::domain(
        "family",
        format!("{} has a single parameter block and no marginal queries", family),
    )
}

impl MarginalQueries for PriorFamily {
    type Mean = ModelParameter;
    type Scale = ModelParameter;

    fn ln_marginal_mean(&self, mean: &ModelParameter) -> Result<f64> {
        match (self, mean) {
            (PriorFamily::NormalInverseWishart(p), ModelParameter::MeanVector(m)) => {
                p.ln_marginal_mean(m)
            }
            (PriorFamily::NormalInverseGamma(p), ModelParameter::Mean(m)) => p.ln_marginal_mean(m),
            (PriorFamily::NormalInverseChiSquared(p), ModelParameter::Mean(m)) => {
                p.ln_marginal_mean(m)
            }
            (PriorFamily::NormalInverseWishart(_), t) => {
                Err(wrong_param("normal_inverse_wishart", "mean_vector", t))
            }
            (p @ (PriorFamily::NormalInverseGamma(_) | PriorFamily::NormalInverseChiSquared(_)), t) => {
                Err(wrong_param(p.family(), "mean", t))
            }
            (p, _) => Err(no_marginals(p.family())),
        }
    }

    fn ln_marginal_scale(&self, scale: &ModelParameter) -> Result<f64> {
        match (self, scale) {
            (PriorFamily::NormalInverseWishart(p), ModelParameter::Covariance(s)) => {
                p.ln_marginal_scale(s)
            }
            (PriorFamily::NormalInverseGamma(p), ModelParameter::Variance(s)) => {
                p.ln_marginal_scale(s)
            }
            (PriorFamily::NormalInverseChiSquared(p), ModelParameter::Variance(s)) => {
                p.ln_marginal_scale(s)
            }
            (PriorFamily::NormalInverseWishart(_), t) => {
                Err(wrong_param("normal_inverse_wishart", "covariance", t))
            }
            (p @ (PriorFamily::NormalInverseGamma(_) | PriorFamily::NormalInverseChiSquared(_)), t) => {
                Err(wrong_param(p.family(), "variance", t))
            }
            (p, _) => Err(no_marginals(p.family())),
        }
    }
}
