//! DPMM configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the sampler configuration file
//! - JSON loading from strings and files
//! - Semantic validation of hyperparameters and sampler settings

pub mod config;
pub mod prior;
pub mod sampler;
pub mod validate;

pub use config::DpmmConfig;
pub use prior::PriorSpec;
pub use sampler::{InitStrategy, SamplerSettings, ScanOrder};
pub use validate::{validate_config, ConfigError, ConfigResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
