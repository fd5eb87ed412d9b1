//! Error types for the DPMM workspace.
//!
//! Every error carries:
//! - a stable numeric code, grouped by category
//! - a category for filtering
//! - a short headline for human output
//!
//! Codes are stable across releases:
//! - 10-19: configuration (fails before any sweep)
//! - 20-29: parameter/observation domain
//! - 30-39: numerical
//! - 40-49: I/O and serialization

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for DPMM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid configuration, hyperparameters or input data shape.
    Config,
    /// A density or likelihood queried outside its support.
    Domain,
    /// Non-finite weights or failed factorizations.
    Numerical,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Domain => write!(f, "domain"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown prior family: {family}")]
    UnknownPriorFamily { family: String },

    #[error("invalid concentration parameter {value}: must be finite and > 0")]
    InvalidConcentration { value: f64 },

    #[error("no observations supplied")]
    EmptyData,

    #[error("observation dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid hyperparameter {family}.{parameter}: {message}")]
    InvalidHyperparameter {
        family: &'static str,
        parameter: String,
        message: String,
    },

    #[error("invalid setting {field}: {message}")]
    InvalidSetting { field: String, message: String },

    // Domain errors (20-29)
    #[error("{parameter} outside support: {message}")]
    InvalidParameterDomain { parameter: String, message: String },

    #[error("invalid observation at index {index}: {message}")]
    InvalidObservation { index: usize, message: String },

    // Numerical errors (30-39)
    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("sampling failed: {0}")]
    Sampling(String),

    // I/O errors (40-49)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameterDomain`].
    pub fn domain(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidParameterDomain {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::InvalidHyperparameter`].
    pub fn hyperparameter(
        family: &'static str,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::InvalidHyperparameter {
            family,
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::UnknownPriorFamily { .. } => 11,
            Error::InvalidConcentration { .. } => 12,
            Error::EmptyData => 13,
            Error::DimensionMismatch { .. } => 14,
            Error::InvalidHyperparameter { .. } => 15,
            Error::InvalidSetting { .. } => 16,
            Error::InvalidParameterDomain { .. } => 20,
            Error::InvalidObservation { .. } => 21,
            Error::Numerical(_) => 30,
            Error::Sampling(_) => 31,
            Error::Io(_) => 40,
            Error::Json(_) => 41,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::UnknownPriorFamily { .. }
            | Error::InvalidConcentration { .. }
            | Error::EmptyData
            | Error::DimensionMismatch { .. }
            | Error::InvalidHyperparameter { .. }
            | Error::InvalidSetting { .. } => ErrorCategory::Config,

            Error::InvalidParameterDomain { .. } | Error::InvalidObservation { .. } => {
                ErrorCategory::Domain
            }

            Error::Numerical(_) | Error::Sampling(_) => ErrorCategory::Numerical,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Whether the caller can fix the problem by changing its inputs.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Numerical(_) | Error::Sampling(_))
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::UnknownPriorFamily { .. } => "Unknown Prior Family",
            Error::InvalidConcentration { .. } => "Invalid Concentration",
            Error::EmptyData => "Empty Data",
            Error::DimensionMismatch { .. } => "Dimension Mismatch",
            Error::InvalidHyperparameter { .. } => "Invalid Hyperparameter",
            Error::InvalidSetting { .. } => "Invalid Sampler Setting",
            Error::InvalidParameterDomain { .. } => "Parameter Outside Support",
            Error::InvalidObservation { .. } => "Invalid Observation",
            Error::Numerical(_) => "Numerical Failure",
            Error::Sampling(_) => "Sampling Failure",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}
