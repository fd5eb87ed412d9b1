//! Dirichlet process mixture modelling with conjugate priors.
//!
//! - [`priors`]: the conjugate prior families, each with sampling, density,
//!   likelihood, posterior update, predictive and evidence.
//! - [`dpmm`]: the collapsed Gibbs sampler over partitions.
//! - [`logging`]: tracing setup and the sampler's event vocabulary.
//!
//! ```ignore
//! use dpmm_config::SamplerSettings;
//! use dpmm_core::{Dpmm, GaussianKnownVariance};
//!
//! let prior = GaussianKnownVariance::new(0.0, 1e6, 0.1)?;
//! let mut model = Dpmm::new(prior, data, SamplerSettings::default())?;
//! model.run(200)?;
//! println!("{:?}", model.assignments());
//! ```

pub mod dpmm;
pub mod logging;
pub mod priors;

pub use dpmm::{ClusterSnapshot, Dpmm, RunSummary, StopSignal, SweepSummary};
pub use dpmm_common::{Error, ErrorCategory, Result};
pub use priors::{
    ConjugatePrior, GaussianKnownVariance, InverseGamma, InverseWishart, MarginalQueries, MeanCov,
    MeanVar, ModelParameter, NormalInverseChiSquared, NormalInverseGamma, NormalInverseWishart,
    Observation, PriorFamily,
};
