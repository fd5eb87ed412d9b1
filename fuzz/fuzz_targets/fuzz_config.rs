//! Fuzz target for DPMM configuration parsing.
//!
//! Parsing, validation and prior construction must reject bad input with an
//! error, never a panic.

#![no_main]

use dpmm_config::{validate_config, DpmmConfig};
use dpmm_core::PriorFamily;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(config) = DpmmConfig::from_str(data) {
        let _ = validate_config(&config);
        let _ = PriorFamily::from_spec(&config.prior);
    }
});
