//! Core types for the Thermoplate simulator.
//!
//! This is the leaf crate with zero internal dependencies. It turns
//! user-supplied physical constants into a stable discretization, owns the
//! temperature grid and its source fields, and defines the immutable
//! [`Snapshot`] handed to every consumer of a running simulation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod model;
pub mod params;
pub mod schedule;
pub mod snapshot;
pub mod thermistor;
pub mod units;

pub use error::ParameterError;
pub use grid::Grid;
pub use model::{CellIndex, Discretization, STABILITY_DIVISOR};
pub use params::{
    Convection, Geometry, HeaterDrive, Material, PhysicalParameters, PlatePoint, SourceDescriptor,
    THERMISTOR_COUNT,
};
pub use schedule::{ActiveWindow, SourceActivity, SourceSchedule};
pub use snapshot::{ScaleTracker, Snapshot};
pub use thermistor::{Readings, ThermistorArray, ThermistorSite, TraceSample};
pub use units::{celsius_to_kelvin, kelvin_to_celsius, ABSOLUTE_ZERO_C, KELVIN_OFFSET};
