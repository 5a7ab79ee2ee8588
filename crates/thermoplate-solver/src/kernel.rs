//! The two interchangeable stencil kernels.
//!
//! Both kernels read a frozen copy of the previous field and write the next
//! one into a separate buffer. For every cell they add the same terms in the
//! same order, through the same inline term functions below, so their
//! output is bitwise identical:
//!
//! 1. interior conduction (cells not on any edge),
//! 2. top and bottom face convection (every cell),
//! 3. heater then perturbation injection (when active),
//! 4. end-face convection on rows `0` and `nx-1`,
//! 5. side-face convection on columns `0` and `ny-1`,
//! 6. one-sided conduction toward the inner neighbour on rows `0` and
//!    `nx-1`, then on columns `0` and `ny-1`,
//! 7. conduction along the edge for edge cells that are not corners.
//!
//! Every pair of adjacent cells exchanges `dc·(Tb − Ta)/d²` in both
//! directions, so conduction alone conserves the total heat content
//! exactly up to rounding. A grid one cell wide along an axis has no
//! neighbour along it; both of its edges still convect.

use thermoplate_core::Discretization;

/// Implementation strategy for one step. Never changes results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StencilKernel {
    /// Whole-field passes: one sweep per term over contiguous rows.
    #[default]
    Sliced,
    /// One visit per cell, branching on edge membership.
    PerCell,
}

impl StencilKernel {
    /// Both kernels, for equivalence checks and benchmarks.
    pub const ALL: [StencilKernel; 2] = [StencilKernel::Sliced, StencilKernel::PerCell];

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            StencilKernel::Sliced => "sliced",
            StencilKernel::PerCell => "per-cell",
        }
    }

    /// Compute the next field from `input` into `out`.
    ///
    /// `out` must have the same length as `input.prev`.
    pub fn apply(&self, coeffs: &StepCoefficients, input: &StencilInput<'_>, out: &mut [f64]) {
        debug_assert_eq!(out.len(), input.prev.len());
        debug_assert_eq!(out.len(), coeffs.nx * coeffs.ny);
        match self {
            StencilKernel::Sliced => sliced(coeffs, input, out),
            StencilKernel::PerCell => per_cell(coeffs, input, out),
        }
    }
}

/// Per-step constants, precombined once per run.
#[derive(Clone, Debug, PartialEq)]
pub struct StepCoefficients {
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Ambient temperature in Kelvin.
    pub ambient_k: f64,
    /// `dt·k/(ρ·cp)`.
    pub diffusion: f64,
    /// `1/dx²`.
    pub inv_dx2: f64,
    /// `1/dy²`.
    pub inv_dy2: f64,
    /// Top plus bottom face loss, `cc · 2·area_top / volume`.
    pub top_loss: f64,
    /// End face loss, `cc · area_ends / volume`.
    pub end_loss: f64,
    /// Side face loss, `cc · area_sides / volume`.
    pub side_loss: f64,
    /// Temperature rise per watt per step, `dt/(ρ·cp)/volume`.
    pub injection: f64,
}

impl StepCoefficients {
    /// Precombine the coefficients for `disc` with the given ambient.
    pub fn new(disc: &Discretization, ambient_k: f64) -> Self {
        let cc = disc.convection_coeff;
        Self {
            nx: disc.nx,
            ny: disc.ny,
            ambient_k,
            diffusion: disc.diffusion_coeff,
            inv_dx2: 1.0 / (disc.dx * disc.dx),
            inv_dy2: 1.0 / (disc.dy * disc.dy),
            top_loss: cc * (2.0 * disc.area_top / disc.volume),
            end_loss: cc * (disc.area_ends / disc.volume),
            side_loss: cc * (disc.area_sides / disc.volume),
            injection: disc.injection_coeff,
        }
    }
}

/// Borrowed inputs for one step. A source field is `Some` only while its
/// window is active.
#[derive(Clone, Copy, Debug)]
pub struct StencilInput<'a> {
    /// Previous temperature field, Kelvin.
    pub prev: &'a [f64],
    /// Heater power field, when active.
    pub heater: Option<&'a [f64]>,
    /// Perturbation power field, when active.
    pub perturbation: Option<&'a [f64]>,
}

// ── Terms ───────────────────────────────────────────────────────

#[inline(always)]
fn interior(k: &StepCoefficients, c: f64, up: f64, down: f64, left: f64, right: f64) -> f64 {
    k.diffusion * ((down + up - 2.0 * c) * k.inv_dx2 + (right + left - 2.0 * c) * k.inv_dy2)
}

#[inline(always)]
fn convect(loss: f64, ambient: f64, c: f64) -> f64 {
    loss * (ambient - c)
}

#[inline(always)]
fn inject(injection: f64, watts: f64) -> f64 {
    injection * watts
}

#[inline(always)]
fn along_edge(diffusion: f64, inv_d2: f64, before: f64, after: f64, c: f64) -> f64 {
    diffusion * ((after + before - 2.0 * c) * inv_d2)
}

#[inline(always)]
fn one_sided(diffusion: f64, inv_d2: f64, neighbour: f64, c: f64) -> f64 {
    diffusion * ((neighbour - c) * inv_d2)
}

// ── Sliced ──────────────────────────────────────────────────────

fn sliced(k: &StepCoefficients, input: &StencilInput<'_>, out: &mut [f64]) {
    let (nx, ny) = (k.nx, k.ny);
    let prev = input.prev;
    out.copy_from_slice(prev);

    if nx > 2 && ny > 2 {
        for i in 1..nx - 1 {
            let up = &prev[(i - 1) * ny..i * ny];
            let row = &prev[i * ny..(i + 1) * ny];
            let down = &prev[(i + 1) * ny..(i + 2) * ny];
            let dst = &mut out[i * ny..(i + 1) * ny];
            for j in 1..ny - 1 {
                dst[j] += interior(k, row[j], up[j], down[j], row[j - 1], row[j + 1]);
            }
        }
    }

    for (o, &c) in out.iter_mut().zip(prev) {
        *o += convect(k.top_loss, k.ambient_k, c);
    }

    for field in [input.heater, input.perturbation].into_iter().flatten() {
        for (o, &w) in out.iter_mut().zip(field) {
            *o += inject(k.injection, w);
        }
    }

    for i in [0, nx - 1] {
        let row = i * ny..(i + 1) * ny;
        for (o, &c) in out[row.clone()].iter_mut().zip(&prev[row]) {
            *o += convect(k.end_loss, k.ambient_k, c);
        }
    }

    for j in [0, ny - 1] {
        for i in 0..nx {
            let q = i * ny + j;
            out[q] += convect(k.side_loss, k.ambient_k, prev[q]);
        }
    }

    if nx > 1 {
        for (i, n) in [(0, 1), (nx - 1, nx - 2)] {
            let row = &prev[i * ny..(i + 1) * ny];
            let inner = &prev[n * ny..(n + 1) * ny];
            let dst = &mut out[i * ny..(i + 1) * ny];
            for j in 0..ny {
                dst[j] += one_sided(k.diffusion, k.inv_dx2, inner[j], row[j]);
            }
        }
    }

    if ny > 1 {
        for (j, n) in [(0, 1), (ny - 1, ny - 2)] {
            for i in 0..nx {
                let q = i * ny;
                out[q + j] += one_sided(k.diffusion, k.inv_dy2, prev[q + n], prev[q + j]);
            }
        }
    }

    if ny > 2 {
        for i in edge_lines(nx) {
            let row = &prev[i * ny..(i + 1) * ny];
            let dst = &mut out[i * ny..(i + 1) * ny];
            for j in 1..ny - 1 {
                dst[j] += along_edge(k.diffusion, k.inv_dy2, row[j - 1], row[j + 1], row[j]);
            }
        }
    }

    if nx > 2 {
        for j in edge_lines(ny) {
            for i in 1..nx - 1 {
                let q = i * ny + j;
                out[q] += along_edge(k.diffusion, k.inv_dx2, prev[q - ny], prev[q + ny], prev[q]);
            }
        }
    }
}

/// Index of the first and last line along an axis, once each.
fn edge_lines(len: usize) -> impl Iterator<Item = usize> {
    let last = (len > 1).then_some(len - 1);
    std::iter::once(0).chain(last)
}

// ── PerCell ─────────────────────────────────────────────────────

fn per_cell(k: &StepCoefficients, input: &StencilInput<'_>, out: &mut [f64]) {
    let (nx, ny) = (k.nx, k.ny);
    let prev = input.prev;

    for i in 0..nx {
        for j in 0..ny {
            let q = i * ny + j;
            let c = prev[q];
            let mut v = c;

            if i > 0 && i + 1 < nx && j > 0 && j + 1 < ny {
                v += interior(k, c, prev[q - ny], prev[q + ny], prev[q - 1], prev[q + 1]);
            }

            v += convect(k.top_loss, k.ambient_k, c);

            if let Some(field) = input.heater {
                v += inject(k.injection, field[q]);
            }
            if let Some(field) = input.perturbation {
                v += inject(k.injection, field[q]);
            }

            if i == 0 {
                v += convect(k.end_loss, k.ambient_k, c);
            }
            if i == nx - 1 {
                v += convect(k.end_loss, k.ambient_k, c);
            }
            if j == 0 {
                v += convect(k.side_loss, k.ambient_k, c);
            }
            if j == ny - 1 {
                v += convect(k.side_loss, k.ambient_k, c);
            }

            if nx > 1 {
                if i == 0 {
                    v += one_sided(k.diffusion, k.inv_dx2, prev[q + ny], c);
                }
                if i == nx - 1 {
                    v += one_sided(k.diffusion, k.inv_dx2, prev[q - ny], c);
                }
            }
            if ny > 1 {
                if j == 0 {
                    v += one_sided(k.diffusion, k.inv_dy2, prev[q + 1], c);
                }
                if j == ny - 1 {
                    v += one_sided(k.diffusion, k.inv_dy2, prev[q - 1], c);
                }
            }

            let row_edge = i == 0 || i == nx - 1;
            let col_edge = j == 0 || j == ny - 1;
            if row_edge && !col_edge {
                v += along_edge(k.diffusion, k.inv_dy2, prev[q - 1], prev[q + 1], c);
            }
            if col_edge && !row_edge {
                v += along_edge(k.diffusion, k.inv_dx2, prev[q - ny], prev[q + ny], c);
            }

            out[q] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coeffs(nx: usize, ny: usize) -> StepCoefficients {
        StepCoefficients {
            nx,
            ny,
            ambient_k: 296.8,
            diffusion: 1.2e-7,
            inv_dx2: 1.0e6,
            inv_dy2: 1.1e6,
            top_loss: 2.6e-3,
            end_loss: 4.3e-6,
            side_loss: 4.4e-6,
            injection: 0.25,
        }
    }

    fn run(kernel: StencilKernel, k: &StepCoefficients, input: &StencilInput<'_>) -> Vec<f64> {
        let mut out = vec![f64::NAN; input.prev.len()];
        kernel.apply(k, input, &mut out);
        out
    }

    #[test]
    fn uniform_ambient_field_is_fixed_point() {
        let k = coeffs(5, 4);
        let prev = vec![k.ambient_k; 20];
        let input = StencilInput {
            prev: &prev,
            heater: None,
            perturbation: None,
        };
        for kernel in StencilKernel::ALL {
            assert_eq!(run(kernel, &k, &input), prev, "{}", kernel.name());
        }
    }

    #[test]
    fn injection_lands_on_source_cell_only() {
        let mut k = coeffs(4, 4);
        k.top_loss = 0.0;
        k.end_loss = 0.0;
        k.side_loss = 0.0;
        let prev = vec![300.0; 16];
        let mut heater = vec![0.0; 16];
        heater[5] = 2.0;
        let input = StencilInput {
            prev: &prev,
            heater: Some(&heater),
            perturbation: None,
        };
        for kernel in StencilKernel::ALL {
            let out = run(kernel, &k, &input);
            assert_eq!(out[5], 300.5);
            assert!(out.iter().enumerate().all(|(q, &t)| q == 5 || t == 300.0));
        }
    }

    #[test]
    fn single_cell_grid_convects_through_every_face() {
        let k = coeffs(1, 1);
        let prev = [300.0];
        let input = StencilInput {
            prev: &prev,
            heater: None,
            perturbation: None,
        };
        let d = k.ambient_k - 300.0;
        let expected = 300.0
            + k.top_loss * d
            + k.end_loss * d
            + k.end_loss * d
            + k.side_loss * d
            + k.side_loss * d;
        for kernel in StencilKernel::ALL {
            assert_eq!(run(kernel, &k, &input)[0], expected);
        }
    }

    fn field(nx: usize, ny: usize) -> impl Strategy<Value = (usize, usize, Vec<f64>, Vec<f64>, Vec<f64>)> {
        (1..=nx, 1..=ny).prop_flat_map(|(nx, ny)| {
            let n = nx * ny;
            (
                Just(nx),
                Just(ny),
                proptest::collection::vec(250.0f64..400.0, n),
                proptest::collection::vec(prop_oneof![Just(0.0), 0.0f64..5.0], n),
                proptest::collection::vec(prop_oneof![Just(0.0), 0.0f64..5.0], n),
            )
        })
    }

    proptest! {
        #[test]
        fn kernels_agree_bitwise(
            (nx, ny, prev, heater, pert) in field(9, 9),
            heater_on in any::<bool>(),
            pert_on in any::<bool>(),
        ) {
            let k = coeffs(nx, ny);
            let input = StencilInput {
                prev: &prev,
                heater: heater_on.then_some(heater.as_slice()),
                perturbation: pert_on.then_some(pert.as_slice()),
            };
            let a = run(StencilKernel::Sliced, &k, &input);
            let b = run(StencilKernel::PerCell, &k, &input);
            for (x, y) in a.iter().zip(&b) {
                prop_assert_eq!(x.to_bits(), y.to_bits());
            }
        }

        #[test]
        fn conduction_alone_conserves_heat((nx, ny, prev, _, _) in field(9, 9)) {
            let mut k = coeffs(nx, ny);
            k.top_loss = 0.0;
            k.end_loss = 0.0;
            k.side_loss = 0.0;
            let input = StencilInput { prev: &prev, heater: None, perturbation: None };
            let before: f64 = prev.iter().sum();
            for kernel in StencilKernel::ALL {
                let after: f64 = run(kernel, &k, &input).iter().sum();
                prop_assert!((after - before).abs() <= 1e-9 * before);
            }
        }
    }
}
