//! Configuration validation errors and semantic validation.
//!
//! Checks here are shape-level: finiteness, positivity, matrix squareness
//! and dimension agreement. Positive-definiteness of scale matrices is
//! checked when the prior is constructed.

use thiserror::Error;

use crate::config::DpmmConfig;
use crate::prior::PriorSpec;
use crate::sampler::SamplerSettings;

/// Validation result type.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown prior family: {family}")]
    UnknownFamily { family: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::IoError(_) => 40,
            ConfigError::ParseError(_) => 41,
            ConfigError::UnknownFamily { .. } => 11,
            ConfigError::InvalidValue { .. } => 16,
            ConfigError::VersionMismatch { .. } => 10,
        }
    }
}

impl From<ConfigError> for dpmm_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownFamily { family } => dpmm_common::Error::UnknownPriorFamily { family },
            ConfigError::InvalidValue { field, message } => {
                dpmm_common::Error::InvalidSetting { field, message }
            }
            other => dpmm_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate a configuration semantically.
pub fn validate_config(config: &DpmmConfig) -> ConfigResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ConfigError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }
    validate_sampler(&config.sampler)?;
    validate_prior(&config.prior)
}

/// Validate sampler settings.
pub fn validate_sampler(settings: &SamplerSettings) -> ConfigResult<()> {
    require_positive("sampler.concentration", settings.concentration)?;
    if settings.iterations == 0 {
        return Err(ConfigError::InvalidValue {
            field: "sampler.iterations".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Validate prior hyperparameters.
pub fn validate_prior(prior: &PriorSpec) -> ConfigResult<()> {
    let fam = prior.family();
    let field = |name: &str| format!("prior.{}.{}", fam, name);

    match prior {
        PriorSpec::NormalInverseWishart {
            mu0,
            kappa0,
            lambda0,
            nu0,
        } => {
            require_vector(&field("mu0"), mu0)?;
            require_positive(&field("kappa0"), *kappa0)?;
            require_square(&field("lambda0"), lambda0, mu0.len())?;
            require_wishart_dof(&field("nu0"), *nu0, mu0.len())
        }
        PriorSpec::NormalInverseGamma { m0, v0, a0, b0 } => {
            require_finite(&field("m0"), *m0)?;
            require_positive(&field("v0"), *v0)?;
            require_positive(&field("a0"), *a0)?;
            require_positive(&field("b0"), *b0)
        }
        PriorSpec::NormalInverseChiSquared {
            mu0,
            kappa0,
            sigma0_sq,
            nu0,
        } => {
            require_finite(&field("mu0"), *mu0)?;
            require_positive(&field("kappa0"), *kappa0)?;
            require_positive(&field("sigma0_sq"), *sigma0_sq)?;
            require_positive(&field("nu0"), *nu0)
        }
        PriorSpec::InverseGamma { alpha, beta, mu } => {
            require_positive(&field("alpha"), *alpha)?;
            require_positive(&field("beta"), *beta)?;
            require_finite(&field("mu"), *mu)
        }
        PriorSpec::InverseWishart { nu, psi, mu } => {
            require_vector(&field("mu"), mu)?;
            require_square(&field("psi"), psi, mu.len())?;
            require_wishart_dof(&field("nu"), *nu, mu.len())
        }
        PriorSpec::GaussianKnownVariance {
            mu0,
            prior_var,
            known_var,
        } => {
            require_finite(&field("mu0"), *mu0)?;
            require_positive(&field("prior_var"), *prior_var)?;
            require_positive(&field("known_var"), *known_var)
        }
    }
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message,
    }
}

fn require_finite(field: &str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() {
        return Err(invalid(field, format!("Must be finite, got {}", value)));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, format!("Must be finite and > 0, got {}", value)));
    }
    Ok(())
}

fn require_vector(field: &str, values: &[f64]) -> ConfigResult<()> {
    if values.is_empty() {
        return Err(invalid(field, "Must have at least one component".to_string()));
    }
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(invalid(field, format!("Components must be finite, got {}", v)));
    }
    Ok(())
}

fn require_square(field: &str, rows: &[Vec<f64>], dim: usize) -> ConfigResult<()> {
    if rows.len() != dim {
        return Err(invalid(
            field,
            format!("Expected {} rows to match the mean, got {}", dim, rows.len()),
        ));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(invalid(
                field,
                format!("Row {} has {} columns, expected {}", i, row.len(), dim),
            ));
        }
        if let Some(v) = row.iter().find(|v| !v.is_finite()) {
            return Err(invalid(field, format!("Entries must be finite, got {}", v)));
        }
    }
    Ok(())
}

fn require_wishart_dof(field: &str, nu: f64, dim: usize) -> ConfigResult<()> {
    let min = dim as f64 - 1.0;
    if !nu.is_finite() || nu <= min {
        return Err(invalid(
            field,
            format!("Must be finite and > {} (dimension - 1), got {}", min, nu),
        ));
    }
    Ok(())
}
