//! Sampler settings.

use serde::{Deserialize, Serialize};

/// How the partition is initialized before the first sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// All observations start in one cluster.
    #[default]
    SingleCluster,
    /// Every observation starts in its own cluster.
    Singletons,
    /// Seat observations one at a time by the CRP prior.
    Crp,
}

/// Order in which observations are visited within a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOrder {
    /// Fresh random permutation per sweep.
    #[default]
    Shuffled,
    /// Index order 0..n.
    Sequential,
}

fn default_concentration() -> f64 {
    1.0
}

fn default_iterations() -> usize {
    100
}

/// Collapsed Gibbs sampler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// CRP concentration α.
    #[serde(default = "default_concentration")]
    pub concentration: f64,

    /// Sweep budget for a full run.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    #[serde(default)]
    pub init: InitStrategy,

    #[serde(default)]
    pub scan_order: ScanOrder,

    /// Seed for the sampler's RNG.
    #[serde(default)]
    pub seed: u64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            concentration: default_concentration(),
            iterations: default_iterations(),
            init: InitStrategy::default(),
            scan_order: ScanOrder::default(),
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_takes_defaults() {
        let s: SamplerSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, SamplerSettings::default());
        assert_eq!(s.concentration, 1.0);
        assert_eq!(s.iterations, 100);
        assert_eq!(s.init, InitStrategy::SingleCluster);
        assert_eq!(s.scan_order, ScanOrder::Shuffled);
        assert_eq!(s.seed, 0);
    }

    #[test]
    fn snake_case_enums() {
        let s: SamplerSettings =
            serde_json::from_str(r#"{"init": "singletons", "scan_order": "sequential"}"#).unwrap();
        assert_eq!(s.init, InitStrategy::Singletons);
        assert_eq!(s.scan_order, ScanOrder::Sequential);

        let s: SamplerSettings = serde_json::from_str(r#"{"init": "crp"}"#).unwrap();
        assert_eq!(s.init, InitStrategy::Crp);
    }
}
