//! Dirichlet process mixture model with collapsed Gibbs updates.
//!
//! Cluster parameters are integrated out: each cluster carries only its
//! member set and the prior updated on those members. A point joins
//! existing cluster c with weight n_c · p(x | members of c) and opens a new
//! cluster with weight α · p(x | prior), all in the log domain.

pub mod gibbs;
pub mod partition;

pub use gibbs::{RunSummary, StopSignal, SweepSummary};
pub use partition::{Cluster, Removal};

use dpmm_common::{Error, Result};
use dpmm_config::{validate_config, validate::validate_sampler, DpmmConfig, InitStrategy, SamplerSettings};
use dpmm_math::{log_gamma, log_sum_exp};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::priors::{ConjugatePrior, Observation, PriorFamily};
use partition::{member_data, Partition};

/// Read-only view of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSnapshot<P> {
    pub id: usize,
    /// Member indices in ascending order.
    pub members: Vec<usize>,
    pub posterior: P,
}

/// Collapsed Gibbs sampler over partitions of `data`.
#[derive(Debug, Clone)]
pub struct Dpmm<P: ConjugatePrior> {
    prior: P,
    alpha: f64,
    ln_alpha: f64,
    data: Vec<P::Obs>,
    /// ln prior.predictive(x_i); fixed for the run.
    prior_ln_pred: Vec<f64>,
    partition: Partition<P>,
    settings: SamplerSettings,
    rng: Xoshiro256PlusPlus,
    iteration: usize,
    log: LogContext,
}

fn check_concentration(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha <= 0.0 {
        return Err(Error::InvalidConcentration { value: alpha });
    }
    Ok(())
}

impl Dpmm<PriorFamily> {
    /// Build a sampler from a configuration document.
    pub fn from_config(config: &DpmmConfig, data: Vec<Observation>) -> Result<Self> {
        check_concentration(config.sampler.concentration)?;
        validate_config(config)?;
        let prior = PriorFamily::from_spec(&config.prior)?;
        Self::new(prior, data, config.sampler.clone())
    }
}

impl<P: ConjugatePrior> Dpmm<P> {
    /// Validate inputs and build the initial partition.
    ///
    /// Fails before any sampling on a non-positive concentration, empty
    /// data, or an observation the prior cannot score.
    pub fn new(prior: P, data: Vec<P::Obs>, settings: SamplerSettings) -> Result<Self> {
        Self::with_log_context(prior, data, settings, LogContext::generate())
    }

    /// [`Dpmm::new`] with an explicit run id for log correlation.
    pub fn with_log_context(
        prior: P,
        data: Vec<P::Obs>,
        settings: SamplerSettings,
        log: LogContext,
    ) -> Result<Self> {
        check_concentration(settings.concentration)?;
        validate_sampler(&settings)?;
        if data.is_empty() {
            return Err(Error::EmptyData);
        }
        let expected = prior.obs_dim();
        for (index, x) in data.iter().enumerate() {
            let actual = prior.observation_dim(x);
            if actual != expected {
                return Err(Error::DimensionMismatch { expected, actual });
            }
            prior.check_observation(x).map_err(|e| match e {
                Error::InvalidParameterDomain { message, .. } => {
                    Error::InvalidObservation { index, message }
                }
                other => other,
            })?;
        }

        let prior_ln_pred = data
            .iter()
            .map(|x| prior.ln_predictive(x))
            .collect::<Result<Vec<f64>>>()?;

        let n = data.len();
        let alpha = settings.concentration;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(settings.seed);
        let groups = initial_groups(settings.init, n, alpha, &mut rng)?;
        let partition = Partition::from_groups(groups, n, &prior, &data)?;

        log_event!(
            log,
            INFO,
            event_names::SAMPLER_INIT,
            Stage::Init,
            "sampler initialized",
            family = prior.family(),
            n_obs = n as u64,
            n_clusters = partition.n_clusters() as u64,
            concentration = alpha,
            seed = settings.seed
        );

        Ok(Self {
            prior,
            alpha,
            ln_alpha: alpha.ln(),
            data,
            prior_ln_pred,
            partition,
            settings,
            rng,
            iteration: 0,
            log,
        })
    }

    pub fn prior(&self) -> &P {
        &self.prior
    }

    pub fn concentration(&self) -> f64 {
        self.alpha
    }

    pub fn data(&self) -> &[P::Obs] {
        &self.data
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    pub fn log_context(&self) -> &LogContext {
        &self.log
    }

    /// Number of sweeps completed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Cluster id of every observation.
    pub fn assignments(&self) -> Vec<usize> {
        self.partition.assignments().to_vec()
    }

    pub fn n_clusters(&self) -> usize {
        self.partition.n_clusters()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.partition.clusters().iter().map(|c| c.size()).collect()
    }

    pub fn clusters(&self) -> &[Cluster<P>] {
        self.partition.clusters()
    }

    /// Id, sorted members and posterior of every cluster.
    pub fn cluster_snapshots(&self) -> Vec<ClusterSnapshot<P>> {
        self.partition
            .clusters()
            .iter()
            .enumerate()
            .map(|(id, c)| {
                let mut members = c.members().to_vec();
                members.sort_unstable();
                ClusterSnapshot {
                    id,
                    members,
                    posterior: c.posterior().clone(),
                }
            })
            .collect()
    }

    /// One parameter per cluster drawn from that cluster's posterior.
    pub fn draw_cluster_parameters(&mut self) -> Result<Vec<P::Param>> {
        let mut out = Vec::with_capacity(self.partition.n_clusters());
        for c in self.partition.clusters() {
            out.push(c.posterior().sample(&mut self.rng)?);
        }
        Ok(out)
    }

    /// ln P(partition) under CRP(α):
    /// K ln α + ln Γ(α) - ln Γ(α + n) + Σ_c ln Γ(n_c).
    pub fn ln_crp_prior(&self) -> f64 {
        let n = self.data.len() as f64;
        let k = self.partition.n_clusters() as f64;
        let sizes: f64 = self
            .partition
            .clusters()
            .iter()
            .map(|c| log_gamma(c.size() as f64))
            .sum();
        k * self.ln_alpha + log_gamma(self.alpha) - log_gamma(self.alpha + n) + sizes
    }

    /// Σ_c ln p(members of c) with cluster parameters integrated out.
    pub fn ln_marginal_likelihood(&self) -> Result<f64> {
        let mut total = 0.0;
        for c in self.partition.clusters() {
            total += self.prior.ln_evidence(&member_data(c.members(), &self.data))?;
        }
        Ok(total)
    }

    /// Collapsed log joint of data and partition.
    pub fn ln_joint(&self) -> Result<f64> {
        let ln_prior = self.ln_crp_prior();
        let ln_lik = self.ln_marginal_likelihood()?;
        log_event!(
            self.log,
            TRACE,
            event_names::READOUT_SCORED,
            Stage::Readout,
            "partition scored",
            ln_crp_prior = ln_prior,
            ln_marginal_likelihood = ln_lik
        );
        Ok(ln_prior + ln_lik)
    }

    /// Log density of a new point under the current mixture:
    /// Σ_c n_c/(n+α) p(x | c) + α/(n+α) p(x | prior).
    pub fn ln_posterior_predictive(&self, x: &P::Obs) -> Result<f64> {
        self.prior.check_observation(x)?;
        let ln_norm = (self.data.len() as f64 + self.alpha).ln();
        let mut terms = Vec::with_capacity(self.partition.n_clusters() + 1);
        for c in self.partition.clusters() {
            terms.push((c.size() as f64).ln() + c.posterior().ln_predictive(x)? - ln_norm);
        }
        terms.push(self.ln_alpha + self.prior.ln_predictive(x)? - ln_norm);
        let out = log_sum_exp(&terms);
        if out.is_nan() {
            return Err(Error::Numerical("posterior predictive is NaN".to_string()));
        }
        Ok(out)
    }
}

/// Initial groups of indices for the chosen strategy.
fn initial_groups(
    init: InitStrategy,
    n: usize,
    alpha: f64,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<Vec<Vec<usize>>> {
    Ok(match init {
        InitStrategy::SingleCluster => vec![(0..n).collect()],
        InitStrategy::Singletons => (0..n).map(|i| vec![i]).collect(),
        InitStrategy::Crp => {
            let ln_alpha = alpha.ln();
            let mut groups: Vec<Vec<usize>> = Vec::new();
            for i in 0..n {
                let mut log_weights: Vec<f64> =
                    groups.iter().map(|g| (g.len() as f64).ln()).collect();
                log_weights.push(ln_alpha);
                let choice = gibbs::ln_pflip(&log_weights, rng)?;
                match groups.get_mut(choice) {
                    Some(g) => g.push(i),
                    None => groups.push(vec![i]),
                }
            }
            groups
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priors::GaussianKnownVariance;

    fn prior() -> GaussianKnownVariance {
        GaussianKnownVariance::new(0.0, 100.0, 0.1).unwrap()
    }

    fn settings(init: InitStrategy) -> SamplerSettings {
        SamplerSettings {
            init,
            seed: 3,
            ..SamplerSettings::default()
        }
    }

    #[test]
    fn init_strategies() {
        let data = vec![0.0, 0.1, 5.0, 5.1];
        let one = Dpmm::new(prior(), data.clone(), settings(InitStrategy::SingleCluster)).unwrap();
        assert_eq!(one.n_clusters(), 1);
        assert_eq!(one.assignments(), vec![0, 0, 0, 0]);

        let many = Dpmm::new(prior(), data.clone(), settings(InitStrategy::Singletons)).unwrap();
        assert_eq!(many.cluster_sizes(), vec![1, 1, 1, 1]);

        let crp = Dpmm::new(prior(), data, settings(InitStrategy::Crp)).unwrap();
        assert_eq!(crp.cluster_sizes().iter().sum::<usize>(), 4);
        assert_eq!(crp.assignments()[0], 0);
    }

    #[test]
    fn rejects_bad_inputs_before_sampling() {
        let mut s = settings(InitStrategy::SingleCluster);
        s.concentration = 0.0;
        assert!(matches!(
            Dpmm::new(prior(), vec![1.0], s),
            Err(Error::InvalidConcentration { .. })
        ));

        assert!(matches!(
            Dpmm::new(prior(), Vec::new(), settings(InitStrategy::SingleCluster)),
            Err(Error::EmptyData)
        ));

        match Dpmm::new(prior(), vec![1.0, f64::NAN], settings(InitStrategy::SingleCluster)) {
            Err(Error::InvalidObservation { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidObservation, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn wrong_observation_dimension_is_a_configuration_error() {
        use crate::priors::NormalInverseWishart;
        use dpmm_common::ErrorCategory;
        use nalgebra::{DMatrix, DVector};

        let niw =
            NormalInverseWishart::new(DVector::zeros(2), 1.0, DMatrix::identity(2, 2), 4.0).unwrap();
        let data = vec![DVector::from_vec(vec![0.0, 0.1]), DVector::from_vec(vec![0.0, 0.1, 0.2])];
        let err = Dpmm::new(niw.clone(), data, settings(InitStrategy::SingleCluster)).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(err.category(), ErrorCategory::Config);

        // The same shape error on a direct query is a domain error.
        let query = niw.ln_predictive(&DVector::from_vec(vec![0.0, 0.1, 0.2])).unwrap_err();
        assert_eq!(query.category(), ErrorCategory::Domain);
    }

    #[test]
    fn crp_prior_of_single_cluster() {
        // One cluster of n: ln α + ln Γ(α) - ln Γ(α+n) + ln Γ(n) = ln(α Γ(α) Γ(n) / Γ(α+n)).
        // With α = 1, n = 4: ln(Γ(4)/Γ(5)) = -ln 4.
        let d = Dpmm::new(prior(), vec![0.0, 1.0, 2.0, 3.0], settings(InitStrategy::SingleCluster)).unwrap();
        assert!((d.ln_crp_prior() + 4.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn crp_prior_of_all_singletons() {
        // n singletons with α = 1: 1 / n!.
        let d = Dpmm::new(prior(), vec![0.0, 1.0, 2.0], settings(InitStrategy::Singletons)).unwrap();
        assert!((d.ln_crp_prior() + 6.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn marginal_likelihood_of_one_cluster_is_evidence() {
        let data = vec![0.3, -0.2, 0.5];
        let d = Dpmm::new(prior(), data.clone(), settings(InitStrategy::SingleCluster)).unwrap();
        let expected = prior().ln_evidence(&data).unwrap();
        assert!((d.ln_marginal_likelihood().unwrap() - expected).abs() < 1e-12);
        assert!((d.ln_joint().unwrap() - (expected + d.ln_crp_prior())).abs() < 1e-12);
    }

    #[test]
    fn posterior_predictive_of_single_cluster() {
        let data = vec![0.3, -0.2, 0.5];
        let d = Dpmm::new(prior(), data.clone(), settings(InitStrategy::SingleCluster)).unwrap();
        let x = 0.1;
        let n = 3.0;
        let post = prior().posterior(&data).unwrap();
        let expected = ((n / (n + 1.0)) * post.predictive(&x).unwrap()
            + (1.0 / (n + 1.0)) * prior().predictive(&x).unwrap())
        .ln();
        assert!((d.ln_posterior_predictive(&x).unwrap() - expected).abs() < 1e-12);
        assert!(d.ln_posterior_predictive(&f64::NAN).is_err());
    }

    #[test]
    fn snapshots_are_sorted() {
        let d = Dpmm::new(prior(), vec![0.0, 1.0, 2.0], settings(InitStrategy::SingleCluster)).unwrap();
        let snaps = d.cluster_snapshots();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].members, vec![0, 1, 2]);
        assert_eq!(snaps[0].id, 0);
    }

    #[test]
    fn draws_one_parameter_per_cluster() {
        let mut d =
            Dpmm::new(prior(), vec![0.0, 1.0, 2.0], settings(InitStrategy::Singletons)).unwrap();
        let params = d.draw_cluster_parameters().unwrap();
        assert_eq!(params.len(), 3);
        assert!(params.iter().all(|p| p.is_finite()));
    }
}
