//! The mutable simulation state: temperatures, source fields and clock.
//!
//! A [`Grid`] is owned by exactly one stepping context. It has no internal
//! locking; consumers never see it directly, only the immutable
//! [`Snapshot`](crate::snapshot::Snapshot)s captured from it between batches.

use crate::model::{CellIndex, Discretization};
use crate::params::{Material, PhysicalParameters, PlatePoint};
use crate::units::celsius_to_kelvin;

/// Temperature field plus the two steady power-source fields.
///
/// All three arrays are `nx × ny`, row-major (`i * ny + j`). Temperatures
/// are in Kelvin. Each power field is zero everywhere except at its
/// source's mapped cell, where it holds the source magnitude in watts.
#[derive(Clone, Debug)]
pub struct Grid {
    nx: usize,
    ny: usize,
    dt: f64,
    ambient_k: f64,
    temperatures: Vec<f64>,
    heater_power: Vec<f64>,
    perturbation_power: Vec<f64>,
    step: u64,
    current_time: f64,
    current_power: f64,
    current_pert: f64,
}

impl Grid {
    /// Build the initial state: `ambient + initial_offset` everywhere,
    /// simulated time zero, both sources idle.
    ///
    /// `disc` must have been derived from `params`.
    pub fn new(params: &PhysicalParameters, disc: &Discretization) -> Self {
        let cells = disc.cell_count();
        let ambient_k = celsius_to_kelvin(params.convection.ambient_c);
        let initial = ambient_k + params.initial_offset_k;

        let mut heater_power = vec![0.0; cells];
        let mut perturbation_power = vec![0.0; cells];
        heater_power[disc.cell_index(params.heater.position).flat(disc.ny)] =
            params.heater.magnitude_w;
        perturbation_power[disc.cell_index(params.perturbation.position).flat(disc.ny)] =
            params.perturbation.magnitude_w;

        Self {
            nx: disc.nx,
            ny: disc.ny,
            dt: disc.dt,
            ambient_k,
            temperatures: vec![initial; cells],
            heater_power,
            perturbation_power,
            step: 0,
            current_time: 0.0,
            current_power: 0.0,
            current_pert: 0.0,
        }
    }

    /// Cells along the plate length.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Cells along the plate width.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.temperatures.len()
    }

    /// Ambient temperature in Kelvin.
    pub fn ambient_k(&self) -> f64 {
        self.ambient_k
    }

    /// The current temperature field in Kelvin, row-major.
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// Per-cell heater power in watts.
    pub fn heater_power(&self) -> &[f64] {
        &self.heater_power
    }

    /// Per-cell perturbation power in watts.
    pub fn perturbation_power(&self) -> &[f64] {
        &self.perturbation_power
    }

    /// Steps completed so far.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Simulated time in seconds, always `step_count() · dt`.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Heater power injected by the most recent step (0 when inactive).
    pub fn current_power(&self) -> f64 {
        self.current_power
    }

    /// Perturbation power injected by the most recent step (0 when inactive).
    pub fn current_pert(&self) -> f64 {
        self.current_pert
    }

    /// Temperature of one cell in Kelvin.
    ///
    /// # Panics
    ///
    /// Panics if `cell` lies outside the grid.
    pub fn temperature(&self, cell: CellIndex) -> f64 {
        self.temperatures[cell.flat(self.ny)]
    }

    /// Temperature in Kelvin at a physical position, by nearest cell.
    pub fn temperature_at(&self, disc: &Discretization, point: PlatePoint) -> f64 {
        self.temperature(disc.cell_index(point))
    }

    /// Accept one step's result.
    ///
    /// Swaps `next` in as the whole temperature field (the previous field
    /// is handed back through `next` for reuse as scratch), records the
    /// source telemetry, and advances the clock by one `dt`.
    pub fn commit_step(&mut self, next: &mut Vec<f64>, power: f64, pert: f64) {
        debug_assert_eq!(next.len(), self.temperatures.len());
        std::mem::swap(&mut self.temperatures, next);
        self.current_power = power;
        self.current_pert = pert;
        self.step += 1;
        self.current_time = self.step as f64 * self.dt;
    }

    /// Total thermal energy `Σ T·ρ·cp·V` in joules, relative to 0 K.
    pub fn thermal_energy(&self, disc: &Discretization, material: &Material) -> f64 {
        let per_kelvin = material.volumetric_heat_capacity() * disc.volume;
        self.temperatures.iter().sum::<f64>() * per_kelvin
    }

    /// Whether every temperature is finite.
    pub fn is_finite(&self) -> bool {
        self.temperatures.iter().all(|t| t.is_finite())
    }
}
