//! Structured event vocabulary for sampler logging.
//!
//! All sampler events carry a run_id and a stage.

use serde::{Deserialize, Serialize};

/// Phases of a sampler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Validation and initial partition.
    Init,
    /// Gibbs sweeps.
    Sweep,
    /// Partition and score read-outs.
    Readout,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Sweep => "sweep",
            Stage::Readout => "readout",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Sampler lifecycle
    pub const SAMPLER_INIT: &str = "sampler.init";

    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_STOPPED: &str = "run.stopped";

    // Sweep stage
    pub const SWEEP_FINISHED: &str = "sweep.finished";
    pub const CLUSTER_OPENED: &str = "cluster.opened";
    pub const CLUSTER_PRUNED: &str = "cluster.pruned";

    // Read-outs
    pub const READOUT_SCORED: &str = "readout.scored";
}

/// Correlation context attached to every event a sampler emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }

    /// Context with a freshly generated run id.
    pub fn generate() -> Self {
        Self::new(super::new_run_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Init.to_string(), "init");
        assert_eq!(Stage::Sweep.to_string(), "sweep");
        assert_eq!(Stage::Readout.to_string(), "readout");
    }

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Sweep).unwrap(), "\"sweep\"");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_names::SAMPLER_INIT, "sampler.init");
        assert_eq!(event_names::SWEEP_FINISHED, "sweep.finished");
        assert_eq!(event_names::RUN_STOPPED, "run.stopped");
    }

    #[test]
    fn test_generated_context() {
        let a = LogContext::generate();
        let b = LogContext::generate();
        assert!(a.run_id.starts_with("run-"));
        assert_ne!(a, b);
    }
}
