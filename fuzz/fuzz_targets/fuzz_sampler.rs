//! Fuzz target for the collapsed Gibbs sampler.
//!
//! Arbitrary observations and settings must either fail validation or run a
//! few sweeps while keeping the partition consistent.

#![no_main]

use arbitrary::Arbitrary;
use dpmm_config::{InitStrategy, SamplerSettings, ScanOrder};
use dpmm_core::{Dpmm, GaussianKnownVariance};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    values: Vec<f64>,
    concentration: f64,
    seed: u64,
    init: u8,
    sequential: bool,
    sweeps: u8,
}

fuzz_target!(|input: Input| {
    let settings = SamplerSettings {
        concentration: input.concentration,
        iterations: 1,
        init: match input.init % 3 {
            0 => InitStrategy::SingleCluster,
            1 => InitStrategy::Singletons,
            _ => InitStrategy::Crp,
        },
        scan_order: if input.sequential {
            ScanOrder::Sequential
        } else {
            ScanOrder::Shuffled
        },
        seed: input.seed,
    };
    let Ok(prior) = GaussianKnownVariance::new(0.0, 100.0, 1.0) else {
        return;
    };
    let values: Vec<f64> = input.values.into_iter().take(64).collect();
    let n = values.len();
    let Ok(mut model) = Dpmm::new(prior, values, settings) else {
        return;
    };
    for _ in 0..(input.sweeps % 4) {
        if model.sweep().is_err() {
            return;
        }
        let assignments = model.assignments();
        assert_eq!(assignments.len(), n);
        assert!(assignments.iter().all(|&c| c < model.n_clusters()));
        assert_eq!(model.cluster_sizes().iter().sum::<usize>(), n);
    }
});
