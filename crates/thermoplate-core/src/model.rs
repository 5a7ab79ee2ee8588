//! Physical-parameter to discretization derivation.
//!
//! [`Discretization::derive`] is a pure function of [`PhysicalParameters`]:
//! cell counts and sizes, a stable explicit time step, lumped face areas,
//! and the per-step coefficients the stepper multiplies by. It is the only
//! place invalid input is rejected.
//!
//! # Time step
//!
//! ```text
//! dt = dx² / (STABILITY_DIVISOR · α),   α = k / (ρ·cp)
//! ```
//!
//! The von Neumann bound for the 2-D explicit scheme alone is `dx²/(4α)`.
//! The divisor is 8, which leaves headroom for the convective terms that
//! are folded into the same explicit update. Lowering it risks oscillating
//! or diverging temperatures, and changes every regression baseline.

use crate::error::ParameterError;
use crate::params::{PhysicalParameters, PlatePoint};
use crate::units::m_to_mm;

/// Divisor applied to `dx²/α` when choosing the time step.
pub const STABILITY_DIVISOR: f64 = 8.0;

/// Mesh resolutions above this are accepted but logged as slow.
pub const FINE_MESH_WARNING: usize = 100;

/// Integer position of a cell: `i` along the length, `j` along the width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellIndex {
    /// Row index along the plate length, `0..nx`.
    pub i: usize,
    /// Column index along the plate width, `0..ny`.
    pub j: usize,
}

impl CellIndex {
    /// Create a cell index.
    pub const fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    /// Row-major flat offset in a grid with `ny` columns.
    #[inline]
    pub fn flat(&self, ny: usize) -> usize {
        self.i * ny + self.j
    }
}

/// Derived discretization of a plate.
///
/// Immutable once derived. All lengths are in metres, times in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Discretization {
    /// Cells along the plate length (equals the mesh resolution).
    pub nx: usize,
    /// Cells along the plate width.
    pub ny: usize,
    /// Cell size along x.
    pub dx: f64,
    /// Cell size along y.
    pub dy: f64,
    /// Cell thickness (the full plate thickness).
    pub dz: f64,
    /// Thermal diffusivity α.
    pub alpha: f64,
    /// Time step.
    pub dt: f64,
    /// Number of steps covering the total simulated time.
    pub nt: u64,
    /// Area of a cell face normal to x (`dy·dz`), exposed on rows `0` and `nx-1`.
    pub area_ends: f64,
    /// Area of a cell face normal to y (`dx·dz`), exposed on columns `0` and `ny-1`.
    pub area_sides: f64,
    /// Area of the top (and bottom) face of a cell (`dx·dy`).
    pub area_top: f64,
    /// Cell volume.
    pub volume: f64,
    /// Per-step diffusion coefficient `dt·k/(ρ·cp)`.
    pub diffusion_coeff: f64,
    /// Per-step convection coefficient `dt·h/(ρ·cp)`.
    pub convection_coeff: f64,
    /// Per-step temperature rise per watt injected into one cell,
    /// `dt/(ρ·cp)/volume`.
    pub injection_coeff: f64,
}

impl Discretization {
    /// Validate `params` and derive the discretization.
    pub fn derive(params: &PhysicalParameters) -> Result<Self, ParameterError> {
        params.validate()?;

        let g = &params.geometry;
        let m = &params.material;
        let n = params.mesh_resolution;

        if n > FINE_MESH_WARNING {
            tracing::warn!(
                resolution = n,
                "mesh resolution above {FINE_MESH_WARNING} may run slowly"
            );
        }

        let nx = n;
        let ny = (n as f64 * g.width_m / g.length_m).round().max(1.0) as usize;
        let dx = g.length_m / nx as f64;
        let dy = g.width_m / ny as f64;
        let dz = g.thickness_m;

        let alpha = m.diffusivity();
        let dt = dx * dx / (STABILITY_DIVISOR * alpha);
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ParameterError::UnstableTimeStep { dt });
        }

        let steps = (params.total_time_s / dt).round();
        if !(steps.is_finite() && steps < u64::MAX as f64) {
            return Err(ParameterError::TooManySteps {
                total_time: params.total_time_s,
                dt,
            });
        }
        let nt = steps as u64;

        let rho_cp = m.volumetric_heat_capacity();
        let volume = dx * dy * dz;

        let disc = Self {
            nx,
            ny,
            dx,
            dy,
            dz,
            alpha,
            dt,
            nt,
            area_ends: dy * dz,
            area_sides: dx * dz,
            area_top: dx * dy,
            volume,
            diffusion_coeff: dt * m.conductivity / rho_cp,
            convection_coeff: dt * params.convection.coefficient / rho_cp,
            injection_coeff: dt / rho_cp / volume,
        };

        tracing::debug!(
            nx = disc.nx,
            ny = disc.ny,
            dx = disc.dx,
            dy = disc.dy,
            dt = disc.dt,
            nt = disc.nt,
            "derived discretization"
        );

        Ok(disc)
    }

    /// Total number of cells, `nx·ny`.
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    /// Nearest cell to a physical position: `round(position / cell_size)`
    /// on each axis, held inside the grid for positions on the far edge.
    pub fn cell_index(&self, point: PlatePoint) -> CellIndex {
        CellIndex {
            i: nearest_cell(point.x_mm / m_to_mm(self.dx), self.nx),
            j: nearest_cell(point.y_mm / m_to_mm(self.dy), self.ny),
        }
    }

    /// Physical position of a cell's node, `(i·dx, j·dy)` in mm.
    pub fn cell_position(&self, cell: CellIndex) -> PlatePoint {
        PlatePoint::new(
            m_to_mm(cell.i as f64 * self.dx),
            m_to_mm(cell.j as f64 * self.dy),
        )
    }

    /// Dimensionless diffusion number `α·dt/dx²` (equals `1/STABILITY_DIVISOR`).
    pub fn stability_number(&self) -> f64 {
        self.alpha * self.dt / (self.dx * self.dx)
    }

    /// Simulated time after `steps` steps.
    ///
    /// Computed by multiplication rather than accumulation so that the
    /// clock never drifts from `k·dt`.
    #[inline]
    pub fn time_at(&self, steps: u64) -> f64 {
        steps as f64 * self.dt
    }
}

fn nearest_cell(ratio: f64, len: usize) -> usize {
    let r = ratio.round();
    if r <= 0.0 {
        0
    } else {
        (r as usize).min(len - 1)
    }
}
