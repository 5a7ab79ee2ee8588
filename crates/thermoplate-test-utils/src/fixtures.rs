//! Standard plate configurations.
//!
//! - [`scenario_params`]: the 117-cell silicon plate used as the numerical
//!   regression baseline.
//! - [`small_plate`]: the default aluminium plate on a coarse mesh with a
//!   short run, for fast engine tests.
//! - [`insulated_plate`] / [`single_source_insulated`]: `h = 0`, for energy
//!   bookkeeping.
//! - [`centered_square_plate`]: a source on the centre cell of a square
//!   plate, for symmetry checks.

use thermoplate_core::{
    ActiveWindow, Geometry, HeaterDrive, Material, PhysicalParameters, PlatePoint,
    SourceDescriptor,
};

/// Source-cell temperature rise over ambient at the end of the scenario run,
/// in K.
pub const SCENARIO_SOURCE_RISE_K: f64 = 6.772_353_395_298_52;

/// 116.44 × 61.68 × 1.82 mm plate (k 350, ρ 2333, cp 896), h 13.5, ambient
/// 23.8 °C, heater driven at −0.824 A × −1.3 W/A over [10 s, 1027 s).
pub fn scenario_params() -> PhysicalParameters {
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
        perturbation: SourceDescriptor::inactive(PlatePoint::new(87.33, 30.84)),
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

/// The default plate on an `n`-cell mesh, heater on for the whole
/// `total_time_s`.
pub fn small_plate(n: usize, total_time_s: f64) -> PhysicalParameters {
    let mut params = PhysicalParameters {
        mesh_resolution: n,
        total_time_s,
        ..Default::default()
    };
    params.heater.window = ActiveWindow::new(0.0, total_time_s);
    params
}

/// No convection and no active sources: total energy must be conserved.
pub fn insulated_plate(n: usize, total_time_s: f64) -> PhysicalParameters {
    let mut params = small_plate(n, total_time_s);
    params.convection.coefficient = 0.0;
    params.heater.window = ActiveWindow::never();
    params.perturbation = SourceDescriptor::inactive(params.perturbation.position);
    params
}

/// No convection, heater only, active over `window`.
pub fn single_source_insulated(
    n: usize,
    total_time_s: f64,
    window: ActiveWindow,
) -> PhysicalParameters {
    let mut params = insulated_plate(n, total_time_s);
    params.heater.window = window;
    params
}

/// Square plate whose `n`-cell mesh (odd `n`) puts the heater exactly on the
/// centre cell, with convection on every face.
pub fn centered_square_plate(n: usize, total_time_s: f64) -> PhysicalParameters {
    let side_mm = 60.0;
    let centre = side_mm * (n / 2) as f64 / n as f64;
    let mut params = small_plate(n, total_time_s);
    params.geometry = Geometry::from_mm(side_mm, side_mm, 1.5);
    params.heater.position = PlatePoint::new(centre, centre);
    params.perturbation = SourceDescriptor::inactive(PlatePoint::new(0.0, 0.0));
    params.thermistors = vec![
        PlatePoint::new(centre, centre),
        PlatePoint::new(0.0, centre),
        PlatePoint::new(centre, 0.0),
    ];
    params
}
