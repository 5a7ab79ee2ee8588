//! Test utilities for Thermoplate development.
//!
//! Provides standard plate configurations ([`fixtures`]) and in-memory
//! [`Write`](std::io::Write) sinks ([`sinks`]) for exercising the recorder
//! without touching the filesystem.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod sinks;

pub use fixtures::{
    centered_square_plate, insulated_plate, scenario_params, single_source_insulated, small_plate,
    SCENARIO_SOURCE_RISE_K,
};
pub use sinks::{FailingSink, SharedSink};

/// Assert two floats agree within an absolute tolerance.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} ± {tol}, got {actual} (diff {})",
        (actual - expected).abs()
    );
}
