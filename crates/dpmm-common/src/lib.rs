//! DPMM common types and errors.
//!
//! This crate provides the error taxonomy shared by the configuration layer,
//! the prior family and the sampler.

pub mod error;

pub use error::{Error, ErrorCategory, Result};
