//! Benchmark profiles for the Thermoplate simulator.
//!
//! - [`reference_profile`]: the 117 × 62 silicon plate (7254 cells) used as
//!   the numerical regression baseline.
//! - [`stress_profile`]: a 300 × 300 aluminium plate (90K cells).
//! - [`warmed_engine`]: a profile built into a [`PlateEngine`] and stepped
//!   past its first transient, with a chosen kernel.
//! - [`step_or_restart`]: one timed step that never runs out of run.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use thermoplate_core::{
    ActiveWindow, Geometry, HeaterDrive, Material, PhysicalParameters, PlatePoint,
    SourceDescriptor,
};
use thermoplate_engine::PlateEngine;
use thermoplate_solver::StencilKernel;

/// 116.44 × 61.68 × 1.82 mm silicon plate on a 117-cell mesh, heater on
/// from 10 s, perturbation on from 200 s.
pub fn reference_profile() -> PhysicalParameters {
    let total_time_s = 1027.0;
    let mut params = PhysicalParameters {
        geometry: Geometry::from_mm(116.44, 61.68, 1.82),
        material: Material {
            conductivity: 350.0,
            density: 2333.0,
            specific_heat: 896.0,
        },
        mesh_resolution: 117,
        total_time_s,
        heater: SourceDescriptor::driven(
            PlatePoint::new(29.11, 30.84),
            HeaterDrive {
                current_a: -0.824,
                transfer_w_per_a: -1.3,
            },
            ActiveWindow::new(10.0, total_time_s),
        ),
        perturbation: SourceDescriptor {
            position: PlatePoint::new(87.33, 30.84),
            magnitude_w: 0.3,
            window: ActiveWindow::new(200.0, total_time_s),
        },
        thermistors: vec![
            PlatePoint::new(58.22, 30.84),
            PlatePoint::new(87.33, 30.84),
            PlatePoint::new(100.0, 50.0),
        ],
        ..Default::default()
    };
    params.convection.coefficient = 13.5;
    params.convection.ambient_c = 23.8;
    params
}

/// Default 120 mm aluminium plate on a 300-cell mesh, both sources on.
pub fn stress_profile() -> PhysicalParameters {
    let mut params = PhysicalParameters {
        mesh_resolution: 300,
        total_time_s: 100.0,
        ..Default::default()
    };
    params.heater.window = ActiveWindow::new(0.0, 100.0);
    params.perturbation.magnitude_w = 0.5;
    params.perturbation.window = ActiveWindow::new(0.0, 100.0);
    params
}

/// Build `params` with `kernel` and run `warmup` steps, so the sources
/// are active and the field is no longer uniform.
///
/// # Panics
///
/// Panics if `params` is invalid; profiles here always are valid.
pub fn warmed_engine(
    params: PhysicalParameters,
    kernel: StencilKernel,
    warmup: u64,
) -> PlateEngine {
    let mut engine = PlateEngine::new(params)
        .unwrap_or_else(|e| panic!("benchmark profile rejected: {e}"))
        .with_kernel(kernel);
    engine.run_batch(warmup);
    engine
}

/// Advance `engine` one step, rewinding it to the start first if the run
/// is already over.
///
/// Criterion may iterate past `nt`, where [`PlateEngine::step`] does
/// nothing; rewinding keeps every iteration a real step.
pub fn step_or_restart(engine: &mut PlateEngine) -> bool {
    if engine.is_finished() {
        engine.reset();
    }
    engine.step()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermoplate_core::Discretization;
    use thermoplate_test_utils::small_plate;

    #[test]
    fn profiles_are_valid() {
        let reference = Discretization::derive(&reference_profile()).unwrap();
        assert_eq!(reference.cell_count(), 117 * 62);
        let stress = Discretization::derive(&stress_profile()).unwrap();
        assert_eq!(stress.cell_count(), 300 * 300);
    }

    #[test]
    fn warmed_engine_has_stepped() {
        let engine = warmed_engine(reference_profile(), StencilKernel::PerCell, 5);
        assert_eq!(engine.steps_done(), 5);
        assert_eq!(engine.kernel(), StencilKernel::PerCell);
    }

    #[test]
    fn step_or_restart_keeps_stepping_past_the_end() {
        let mut engine = warmed_engine(small_plate(4, 20.0), StencilKernel::Sliced, 0);
        let nt = engine.total_steps();
        assert!(nt > 0);
        for _ in 0..nt {
            assert!(step_or_restart(&mut engine));
        }
        assert!(engine.is_finished());
        assert!(step_or_restart(&mut engine));
        assert_eq!(engine.steps_done(), 1);
    }
}
