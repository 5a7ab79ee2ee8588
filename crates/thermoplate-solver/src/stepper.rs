//! Time integration of a [`Grid`].

use thermoplate_core::{Discretization, Grid, PhysicalParameters, SourceSchedule};

use crate::kernel::{StencilInput, StencilKernel, StepCoefficients};

/// Advances a grid by one explicit time step per call.
///
/// Holds the precombined coefficients, the source schedule and a scratch
/// field reused across steps, so stepping allocates nothing. A stepper is
/// built for one discretization; feeding it a grid of a different shape is
/// a caller error.
#[derive(Clone, Debug)]
pub struct Stepper {
    kernel: StencilKernel,
    coeffs: StepCoefficients,
    schedule: SourceSchedule,
    heater_w: f64,
    perturbation_w: f64,
    dt: f64,
    scratch: Vec<f64>,
}

impl Stepper {
    /// Build a stepper for `params` discretized as `disc`, using the
    /// default kernel.
    pub fn new(params: &PhysicalParameters, disc: &Discretization) -> Self {
        let ambient_k = thermoplate_core::celsius_to_kelvin(params.convection.ambient_c);
        Self {
            kernel: StencilKernel::default(),
            coeffs: StepCoefficients::new(disc, ambient_k),
            schedule: SourceSchedule {
                heater: params.heater.window,
                perturbation: params.perturbation.window,
            },
            heater_w: params.heater.magnitude_w,
            perturbation_w: params.perturbation.magnitude_w,
            dt: disc.dt,
            scratch: vec![0.0; disc.cell_count()],
        }
    }

    /// Use `kernel` for subsequent steps.
    pub fn with_kernel(mut self, kernel: StencilKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// The kernel in use.
    pub fn kernel(&self) -> StencilKernel {
        self.kernel
    }

    /// The time step in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The precombined per-step coefficients.
    pub fn coefficients(&self) -> &StepCoefficients {
        &self.coeffs
    }

    /// The source schedule evaluated every step.
    pub fn schedule(&self) -> &SourceSchedule {
        &self.schedule
    }

    /// Advance `grid` by exactly one `dt`.
    ///
    /// Source windows are evaluated at the grid's time before the step.
    /// The new field is computed entirely from the previous one and then
    /// swapped in whole.
    pub fn step(&mut self, grid: &mut Grid) {
        debug_assert_eq!(grid.cell_count(), self.scratch.len());
        let active = self.schedule.at(grid.current_time());

        let input = StencilInput {
            prev: grid.temperatures(),
            heater: active.heater.then_some(grid.heater_power()),
            perturbation: active.perturbation.then_some(grid.perturbation_power()),
        };
        self.kernel.apply(&self.coeffs, &input, &mut self.scratch);

        let power = if active.heater { self.heater_w } else { 0.0 };
        let pert = if active.perturbation {
            self.perturbation_w
        } else {
            0.0
        };
        grid.commit_step(&mut self.scratch, power, pert);
    }

    /// Advance `grid` by `steps` steps.
    pub fn run(&mut self, grid: &mut Grid, steps: u64) {
        for _ in 0..steps {
            self.step(grid);
        }
    }
}
