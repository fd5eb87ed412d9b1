//! Fuzz target for Normal-Inverse-Wishart construction and scoring.
//!
//! Arbitrary (possibly non-finite, indefinite) hyperparameters must be
//! rejected at construction or produce a finite-or-error score.

#![no_main]

use arbitrary::Arbitrary;
use dpmm_core::{ConjugatePrior, NormalInverseWishart};
use libfuzzer_sys::fuzz_target;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Arbitrary)]
struct Input {
    mu0: [f64; 2],
    kappa0: f64,
    lambda0: [f64; 4],
    nu0: f64,
    points: Vec<[f64; 2]>,
}

fuzz_target!(|input: Input| {
    let Ok(prior) = NormalInverseWishart::new(
        DVector::from_column_slice(&input.mu0),
        input.kappa0,
        DMatrix::from_row_slice(2, 2, &input.lambda0),
        input.nu0,
    ) else {
        return;
    };
    let points: Vec<DVector<f64>> = input
        .points
        .iter()
        .take(16)
        .map(|p| DVector::from_column_slice(p))
        .collect();
    if let Some(x) = points.first() {
        if let Ok(v) = prior.ln_predictive(x) {
            assert!(!v.is_nan());
        }
    }
    let _ = prior.ln_evidence(&points);
    let _ = prior.posterior(&points);
});
