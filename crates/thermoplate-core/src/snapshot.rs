//! Immutable published state and renderer colour-scale tracking.

use crate::grid::Grid;
use crate::model::CellIndex;
use crate::units::kelvin_to_celsius;

/// A fully-formed copy of the simulation state at one instant.
///
/// Captured by the stepping owner between batches and shared read-only
/// (behind an `Arc`) with any number of consumers. Never mutated after
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    step: u64,
    time: f64,
    power: f64,
    perturbation: f64,
    nx: usize,
    ny: usize,
    temperatures: Vec<f64>,
}

impl Snapshot {
    /// Copy the current state of `grid`.
    pub fn capture(grid: &Grid) -> Self {
        Self {
            step: grid.step_count(),
            time: grid.current_time(),
            power: grid.current_power(),
            perturbation: grid.current_pert(),
            nx: grid.nx(),
            ny: grid.ny(),
            temperatures: grid.temperatures().to_vec(),
        }
    }

    /// Steps completed when the snapshot was taken.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Heater power being injected, in W (0 when inactive).
    pub fn power(&self) -> f64 {
        self.power
    }

    /// Perturbation power being injected, in W (0 when inactive).
    pub fn perturbation(&self) -> f64 {
        self.perturbation
    }

    /// Cells along the plate length.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Cells along the plate width.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Temperature field in Kelvin, row-major `nx × ny`.
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// Temperature of one cell in Kelvin.
    ///
    /// # Panics
    ///
    /// Panics if `cell` lies outside the grid.
    pub fn temperature(&self, cell: CellIndex) -> f64 {
        self.temperatures[cell.flat(self.ny)]
    }

    /// Temperature of one cell in degrees Celsius.
    pub fn celsius(&self, cell: CellIndex) -> f64 {
        kelvin_to_celsius(self.temperature(cell))
    }

    /// The whole field converted to Celsius.
    pub fn celsius_field(&self) -> Vec<f64> {
        self.temperatures.iter().copied().map(kelvin_to_celsius).collect()
    }

    /// Lowest and highest temperature in Celsius, or `None` for an empty field.
    pub fn range_celsius(&self) -> Option<(f64, f64)> {
        let mut it = self.temperatures.iter().copied();
        let first = it.next()?;
        let (lo, hi) = it.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some((kelvin_to_celsius(lo), kelvin_to_celsius(hi)))
    }

    /// Cell with the highest temperature (first one on ties).
    pub fn hottest_cell(&self) -> Option<CellIndex> {
        let mut best: Option<(usize, f64)> = None;
        for (k, &t) in self.temperatures.iter().enumerate() {
            if best.is_none_or(|(_, b)| t > b) {
                best = Some((k, t));
            }
        }
        best.map(|(k, _)| CellIndex::new(k / self.ny, k % self.ny))
    }
}

// ── ScaleTracker ────────────────────────────────────────────────

/// Running global min/max (Celsius) over every snapshot observed.
///
/// Renderers use it to keep a stable colour scale across frames. Missing a
/// snapshot only makes the range narrower than the true extremes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScaleTracker {
    range: Option<(f64, f64)>,
}

impl ScaleTracker {
    /// A tracker that has observed nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the range to include `snapshot`, returning the updated range.
    pub fn observe(&mut self, snapshot: &Snapshot) -> Option<(f64, f64)> {
        if let Some((lo, hi)) = snapshot.range_celsius() {
            self.range = Some(match self.range {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
        self.range
    }

    /// Current `(min, max)` in Celsius.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    /// Forget everything observed (e.g. when a new run starts).
    pub fn reset(&mut self) {
        self.range = None;
    }
}
