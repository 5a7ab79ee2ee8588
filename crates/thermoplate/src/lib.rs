//! Thermoplate: transient 2-D heat conduction in a thin plate.
//!
//! This is the facade crate that re-exports the public API of the
//! Thermoplate sub-crates. For most users, adding `thermoplate` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use thermoplate::prelude::*;
//!
//! // The default 120 mm aluminium plate, coarse mesh, one minute.
//! let params = PhysicalParameters {
//!     mesh_resolution: 12,
//!     total_time_s: 60.0,
//!     ..Default::default()
//! };
//! let mut run = LockstepRun::new(params, &DriverConfig::default()).unwrap();
//! let last = run.run_to_completion(|_| {});
//! assert_eq!(last.step(), run.engine().total_steps());
//! assert!(last.range_celsius().unwrap().1 > 25.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `thermoplate-core` | Parameters, discretization, grid, snapshots, thermistors |
//! | [`solver`] | `thermoplate-solver` | Explicit stepper and stencil kernels |
//! | [`engine`] | `thermoplate-engine` | Lockstep runs, background driver, snapshot ring, recorder |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Physical model, grid state and snapshots (`thermoplate-core`).
pub use thermoplate_core as types;

/// Explicit finite-difference stepper (`thermoplate-solver`).
///
/// [`solver::Stepper`] advances a grid one `dt` per call using either
/// [`solver::StencilKernel`]; both give bitwise-identical results.
pub use thermoplate_solver as solver;

/// Run orchestration (`thermoplate-engine`).
///
/// [`engine::LockstepRun`] for synchronous batches,
/// [`engine::SimulationDriver`] for a background stepping thread, and
/// [`engine::Recorder`] for the thermistor log.
pub use thermoplate_engine as engine;

/// Common imports for typical Thermoplate usage.
///
/// ```rust
/// use thermoplate::prelude::*;
/// ```
pub mod prelude {
    // Parameters
    pub use thermoplate_core::{
        ActiveWindow, Convection, Geometry, HeaterDrive, Material, PhysicalParameters,
        PlatePoint, SourceDescriptor,
    };

    // State
    pub use thermoplate_core::{CellIndex, Discretization, Grid, ScaleTracker, Snapshot};

    // Probes
    pub use thermoplate_core::{ThermistorArray, ThermistorSite};

    // Errors
    pub use thermoplate_core::ParameterError;
    pub use thermoplate_engine::{ConfigError, RecordError};

    // Solver
    pub use thermoplate_solver::{StencilKernel, Stepper};

    // Engine
    pub use thermoplate_engine::{
        CancelToken, DriverConfig, DriverReport, LockstepRun, PlateEngine, Recorder,
        RecorderConfig, RunOutcome, SimulationDriver, SnapshotRing,
    };
}
