//! Plate engine: the single-threaded owner of one run's state.
//!
//! [`PlateEngine`] wires the derived discretization, the grid, the stepper
//! and the thermistor sites together. It has no threads of its own:
//! [`LockstepRun`](crate::LockstepRun) drives it on the caller's thread and
//! [`SimulationDriver`](crate::SimulationDriver) moves it onto a background
//! thread. Either way, exactly one owner mutates the grid.

use thermoplate_core::{
    Discretization, Grid, ParameterError, PhysicalParameters, Snapshot, ThermistorArray,
};
use thermoplate_solver::{StencilKernel, Stepper};

/// Grid, stepper and probes for one run.
///
/// A run ends after `nt` steps, at simulated time `nt · dt`. A finished
/// engine refuses further steps; [`reset`](Self::reset) rebuilds the grid
/// from the original parameters.
#[derive(Clone, Debug)]
pub struct PlateEngine {
    params: PhysicalParameters,
    disc: Discretization,
    grid: Grid,
    stepper: Stepper,
    thermistors: ThermistorArray,
}

impl PlateEngine {
    /// Validate `params`, derive the discretization and build the initial
    /// grid.
    pub fn new(params: PhysicalParameters) -> Result<Self, ParameterError> {
        let disc = Discretization::derive(&params)?;
        let grid = Grid::new(&params, &disc);
        let stepper = Stepper::new(&params, &disc);
        let thermistors = ThermistorArray::from_params(&params, &disc);
        Ok(Self {
            params,
            disc,
            grid,
            stepper,
            thermistors,
        })
    }

    /// Use `kernel` for subsequent steps.
    pub fn with_kernel(mut self, kernel: StencilKernel) -> Self {
        self.stepper = self.stepper.with_kernel(kernel);
        self
    }

    /// The parameters this run was built from.
    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    /// The derived discretization.
    pub fn discretization(&self) -> &Discretization {
        &self.disc
    }

    /// Current grid state.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The thermistor sites, mapped to cells.
    pub fn thermistors(&self) -> &ThermistorArray {
        &self.thermistors
    }

    /// The stencil kernel in use.
    pub fn kernel(&self) -> StencilKernel {
        self.stepper.kernel()
    }

    /// Steps completed so far.
    pub fn steps_done(&self) -> u64 {
        self.grid.step_count()
    }

    /// Total steps in the run (`nt`).
    pub fn total_steps(&self) -> u64 {
        self.disc.nt
    }

    /// Steps left before the run ends.
    pub fn remaining_steps(&self) -> u64 {
        self.disc.nt.saturating_sub(self.grid.step_count())
    }

    /// Whether the run has reached its end time.
    pub fn is_finished(&self) -> bool {
        self.remaining_steps() == 0
    }

    /// Simulated time in seconds.
    pub fn current_time(&self) -> f64 {
        self.grid.current_time()
    }

    /// Advance one step. Returns `false` (and does nothing) once the run
    /// is finished.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.stepper.step(&mut self.grid);
        true
    }

    /// Advance up to `max_steps` steps, stopping at the end of the run.
    ///
    /// Returns the number of steps taken. Every step completes before this
    /// returns, so the grid is never left mid-step.
    pub fn run_batch(&mut self, max_steps: u64) -> u64 {
        let steps = max_steps.min(self.remaining_steps());
        self.stepper.run(&mut self.grid, steps);
        steps
    }

    /// Copy the current state for publication.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.grid)
    }

    /// Rebuild the grid from the original parameters, back at `t = 0`.
    pub fn reset(&mut self) {
        self.grid = Grid::new(&self.params, &self.disc);
    }
}
