//! Configuration errors for the physical model.
//!
//! Every variant corresponds to one invariant of [`PhysicalParameters`]
//! that is checked once, before a run starts. None of these can surface
//! mid-run: the stepper performs no validation on its hot path.
//!
//! [`PhysicalParameters`]: crate::params::PhysicalParameters

use std::error::Error;
use std::fmt;

use crate::params::PlatePoint;

/// Rejection reasons for a set of physical parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterError {
    /// Mesh resolution must be at least one cell.
    MeshTooCoarse {
        /// The configured resolution.
        resolution: usize,
    },
    /// A quantity that must be strictly positive was zero or negative.
    NonPositive {
        /// Name of the offending quantity.
        quantity: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A quantity that must be non-negative was negative.
    Negative {
        /// Name of the offending quantity.
        quantity: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A quantity was NaN or infinite.
    NonFinite {
        /// Name of the offending quantity.
        quantity: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A temperature lies below absolute zero.
    BelowAbsoluteZero {
        /// Name of the offending temperature.
        quantity: &'static str,
        /// The rejected value in degrees Celsius.
        celsius: f64,
    },
    /// A source window is reversed or extends outside `[0, total_time]`.
    InvalidWindow {
        /// Which source the window belongs to.
        source: &'static str,
        /// Window start in simulated seconds.
        start: f64,
        /// Window stop in simulated seconds.
        stop: f64,
        /// Total simulated time of the run.
        total_time: f64,
    },
    /// A source or thermistor position lies outside the plate.
    OutsidePlate {
        /// What was being placed, e.g. `"heater"` or `"thermistor t2"`.
        item: String,
        /// The rejected position.
        position: PlatePoint,
        /// Plate length in millimetres.
        length_mm: f64,
        /// Plate width in millimetres.
        width_mm: f64,
    },
    /// The log has a fixed set of thermistor columns; a different number of
    /// positions was configured.
    ThermistorCount {
        /// Positions configured.
        configured: usize,
        /// Positions required.
        required: usize,
    },
    /// The derived time step is not a positive finite number.
    UnstableTimeStep {
        /// The derived time step in seconds.
        dt: f64,
    },
    /// The run would need more steps than can be counted.
    TooManySteps {
        /// Total simulated time requested.
        total_time: f64,
        /// The derived time step in seconds.
        dt: f64,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeshTooCoarse { resolution } => {
                write!(f, "mesh resolution must be at least 1, got {resolution}")
            }
            Self::NonPositive { quantity, value } => {
                write!(f, "{quantity} must be positive, got {value}")
            }
            Self::Negative { quantity, value } => {
                write!(f, "{quantity} must be non-negative, got {value}")
            }
            Self::NonFinite { quantity, value } => {
                write!(f, "{quantity} must be finite, got {value}")
            }
            Self::BelowAbsoluteZero { quantity, celsius } => {
                write!(f, "{quantity} must be at least -273.15 °C, got {celsius} °C")
            }
            Self::InvalidWindow {
                source,
                start,
                stop,
                total_time,
            } => write!(
                f,
                "{source} window [{start}, {stop}) must satisfy 0 <= start <= stop <= {total_time}"
            ),
            Self::OutsidePlate {
                item,
                position,
                length_mm,
                width_mm,
            } => write!(
                f,
                "{item} at ({}, {}) mm lies outside the {length_mm} x {width_mm} mm plate",
                position.x_mm, position.y_mm
            ),
            Self::ThermistorCount {
                configured,
                required,
            } => write!(
                f,
                "exactly {required} thermistor positions are required, got {configured}"
            ),
            Self::UnstableTimeStep { dt } => {
                write!(f, "derived time step must be positive and finite, got {dt}")
            }
            Self::TooManySteps { total_time, dt } => {
                write!(f, "total time {total_time} s needs too many steps of {dt} s")
            }
        }
    }
}

impl Error for ParameterError {}
