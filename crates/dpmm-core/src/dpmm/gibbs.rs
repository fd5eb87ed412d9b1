//! Gibbs sweeps and run control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dpmm_common::{Error, Result};
use dpmm_config::ScanOrder;
use dpmm_math::normalize_log_probs;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::partition::Removal;
use super::Dpmm;
use crate::log_event;
use crate::logging::{event_names, Stage};
use crate::priors::ConjugatePrior;

/// Cooperative cancellation flag, checked between sweeps.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run holding a clone of this signal to stop after its
    /// current sweep.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// 1-based sweep number over the sampler's lifetime.
    pub iteration: usize,
    pub n_clusters: usize,
    /// Collapsed log joint after the sweep.
    pub ln_joint: f64,
    /// Points seated at a new table. A singleton re-seated alone counts here
    /// and in `pruned`.
    pub opened: usize,
    pub pruned: usize,
}

/// Outcome of [`Dpmm::run`] / [`Dpmm::run_until`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub sweeps_completed: usize,
    pub stopped_early: bool,
    pub n_clusters: usize,
    /// Cluster count after each completed sweep.
    pub cluster_count_trace: Vec<usize>,
}

/// Draw an index from unnormalized log weights.
pub(crate) fn ln_pflip<R: Rng + ?Sized>(log_weights: &[f64], rng: &mut R) -> Result<usize> {
    let log_probs = normalize_log_probs(log_weights).ok_or_else(|| {
        Error::Numerical(format!(
            "assignment weights cannot be normalized: {:?}",
            log_weights
        ))
    })?;
    let u: f64 = rng.random();
    let mut cumulative = 0.0;
    for (k, lp) in log_probs.iter().enumerate() {
        cumulative += lp.exp();
        if u < cumulative {
            return Ok(k);
        }
    }
    // Rounding left the total just under u; fall back to the last
    // outcome with nonzero mass.
    log_probs
        .iter()
        .rposition(|lp| lp.is_finite())
        .ok_or_else(|| Error::Numerical("all assignment weights are zero".to_string()))
}

impl<P: ConjugatePrior> Dpmm<P> {
    /// Reassign every observation once.
    pub fn sweep(&mut self) -> Result<SweepSummary> {
        let mut order: Vec<usize> = (0..self.data.len()).collect();
        if self.settings.scan_order == ScanOrder::Shuffled {
            order.shuffle(&mut self.rng);
        }

        let mut opened = 0;
        let mut pruned = 0;
        for i in order {
            if self.partition.remove(i, &self.prior, &self.data)? == Removal::Destroyed {
                pruned += 1;
                log_event!(
                    self.log,
                    TRACE,
                    event_names::CLUSTER_PRUNED,
                    Stage::Sweep,
                    "cluster emptied",
                    index = i as u64,
                    n_clusters = self.partition.n_clusters() as u64
                );
            }

            let seated = self.draw_seat(i).and_then(|target| {
                let new_table = target == self.partition.n_clusters();
                self.partition
                    .insert(i, target, &self.prior, &self.data)
                    .map(|_| new_table)
            });
            let new_table = match seated {
                Ok(new_table) => new_table,
                Err(e) => {
                    // Re-seat alone so every index stays assigned.
                    self.partition.seat_alone(i, &self.prior, &self.data);
                    return Err(e);
                }
            };
            if new_table {
                opened += 1;
                log_event!(
                    self.log,
                    TRACE,
                    event_names::CLUSTER_OPENED,
                    Stage::Sweep,
                    "cluster opened",
                    index = i as u64,
                    n_clusters = self.partition.n_clusters() as u64
                );
            }
        }

        self.iteration += 1;
        let summary = SweepSummary {
            iteration: self.iteration,
            n_clusters: self.partition.n_clusters(),
            ln_joint: self.ln_joint()?,
            opened,
            pruned,
        };
        log_event!(
            self.log,
            DEBUG,
            event_names::SWEEP_FINISHED,
            Stage::Sweep,
            "sweep finished",
            iteration = summary.iteration as u64,
            n_clusters = summary.n_clusters as u64,
            ln_joint = summary.ln_joint,
            opened = summary.opened as u64,
            pruned = summary.pruned as u64
        );
        Ok(summary)
    }

    /// Choose a cluster for the unassigned point `i`. Returns the current
    /// cluster count to mean "new cluster".
    fn draw_seat(&mut self, i: usize) -> Result<usize> {
        let x = &self.data[i];
        let clusters = self.partition.clusters();
        let mut log_weights = Vec::with_capacity(clusters.len() + 1);
        for c in clusters {
            log_weights.push((c.size() as f64).ln() + c.posterior().ln_predictive(x)?);
        }
        log_weights.push(self.ln_alpha + self.prior_ln_pred[i]);
        ln_pflip(&log_weights, &mut self.rng)
    }

    /// Run `iterations` sweeps.
    pub fn run(&mut self, iterations: usize) -> Result<RunSummary> {
        self.run_until(iterations, &StopSignal::new())
    }

    /// Run the number of sweeps in the sampler settings.
    pub fn run_configured(&mut self) -> Result<RunSummary> {
        self.run(self.settings.iterations)
    }

    /// Run up to `iterations` sweeps, stopping early once `stop` is raised.
    /// A sweep in progress always completes, so the partition stays valid.
    pub fn run_until(&mut self, iterations: usize, stop: &StopSignal) -> Result<RunSummary> {
        log_event!(
            self.log,
            INFO,
            event_names::RUN_STARTED,
            Stage::Sweep,
            "run started",
            iterations = iterations as u64,
            n_clusters = self.partition.n_clusters() as u64
        );

        let mut trace = Vec::new();
        let mut stopped_early = false;
        for _ in 0..iterations {
            if stop.is_stopped() {
                stopped_early = true;
                log_event!(
                    self.log,
                    INFO,
                    event_names::RUN_STOPPED,
                    Stage::Sweep,
                    "run stopped on request",
                    sweeps_completed = trace.len() as u64
                );
                break;
            }
            trace.push(self.sweep()?.n_clusters);
        }

        let summary = RunSummary {
            sweeps_completed: trace.len(),
            stopped_early,
            n_clusters: self.partition.n_clusters(),
            cluster_count_trace: trace,
        };
        log_event!(
            self.log,
            INFO,
            event_names::RUN_FINISHED,
            Stage::Sweep,
            "run finished",
            sweeps_completed = summary.sweeps_completed as u64,
            n_clusters = summary.n_clusters as u64
        );
        Ok(summary)
    }
}
