//! Top-level configuration document.

use serde::{Deserialize, Serialize};

use crate::prior::{PriorSpec, KNOWN_FAMILIES};
use crate::sampler::SamplerSettings;
use crate::validate::{validate_config, ConfigError, ConfigResult};

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

/// A complete DPMM run configuration.
///
/// ```json
/// {
///   "schema_version": "1.0.0",
///   "prior": { "family": "gaussian_known_variance", "mu0": 0.0, "prior_var": 100.0, "known_var": 0.1 },
///   "sampler": { "concentration": 1.0, "iterations": 200, "seed": 7 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpmmConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    pub prior: PriorSpec,

    #[serde(default)]
    pub sampler: SamplerSettings,
}

impl DpmmConfig {
    /// Build a config with default sampler settings.
    pub fn new(prior: PriorSpec) -> Self {
        Self {
            schema_version: default_schema_version(),
            prior,
            sampler: SamplerSettings::default(),
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a JSON string.
    ///
    /// Unrecognized `prior.family` tags are reported as
    /// [`ConfigError::UnknownFamily`] rather than a generic parse error.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> ConfigResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ConfigError::ParseError(format!("Invalid JSON: {}", e)))?;

        if let Some(family) = value
            .get("prior")
            .and_then(|p| p.get("family"))
            .and_then(|f| f.as_str())
        {
            if !KNOWN_FAMILIES.contains(&family) {
                return Err(ConfigError::UnknownFamily {
                    family: family.to_string(),
                });
            }
        }

        serde_json::from_value(value)
            .map_err(|e| ConfigError::ParseError(format!("Invalid config: {}", e)))
    }

    /// Load from a file and validate.
    pub fn load(path: &std::path::Path) -> ConfigResult<Self> {
        let config = Self::from_file(path)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("Serialization failed: {}", e)))
    }
}
