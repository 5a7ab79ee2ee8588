//! Run orchestration for the Thermoplate simulator.
//!
//! Two ways to drive a [`PlateEngine`]:
//!
//! - [`LockstepRun`]: synchronous, one batch per call on the caller's
//!   thread.
//! - [`SimulationDriver`]: a background stepping thread publishing one
//!   [`Snapshot`](thermoplate_core::Snapshot) per batch into a
//!   [`SnapshotRing`], cancellable through a [`CancelToken`].
//!
//! A [`Recorder`] samples the ring on its own wall-clock cadence and writes
//! the thermistor log.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod config;
pub mod driver;
mod driver_thread;
pub mod lockstep;
pub mod metrics;
pub mod plate;
pub mod recorder;
pub mod ring;

pub use cancel::CancelToken;
pub use config::{
    ConfigError, DriverConfig, RecorderConfig, MAX_RECORD_INTERVAL, MIN_PACING,
};
pub use driver::{DriverReport, SimulationDriver};
pub use driver_thread::RunOutcome;
pub use lockstep::{BatchResult, LockstepRun};
pub use metrics::{BatchMetrics, RunMetrics};
pub use plate::PlateEngine;
pub use recorder::{create_log, RecordError, Recorder, RecorderReport, TraceRow, Traces};
pub use ring::SnapshotRing;
