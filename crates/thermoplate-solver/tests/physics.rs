//! Physical properties of the stepper: energy bookkeeping, steady state,
//! symmetry and determinism.

use proptest::prelude::*;
use thermoplate_core::{ActiveWindow, Discretization, Grid, PhysicalParameters, Snapshot};
use thermoplate_solver::{StencilKernel, Stepper};
use thermoplate_test_utils::{
    centered_square_plate, insulated_plate, single_source_insulated, small_plate,
};

fn setup(params: &PhysicalParameters) -> (Discretization, Grid, Stepper) {
    let disc = Discretization::derive(params).unwrap();
    let grid = Grid::new(params, &disc);
    let stepper = Stepper::new(params, &disc);
    (disc, grid, stepper)
}

#[test]
fn injected_energy_matches_power_then_holds() {
    let params = single_source_insulated(12, 40.0, ActiveWindow::new(0.0, 20.0));
    let (disc, mut grid, mut stepper) = setup(&params);
    let e0 = grid.thermal_energy(&disc, &params.material);
    let power = params.heater.magnitude_w;

    let mut previous = e0;
    let mut injected = 0.0;
    while grid.current_time() < 40.0 - disc.dt {
        let was_active = params.heater.window.is_active(grid.current_time());
        stepper.step(&mut grid);
        let e = grid.thermal_energy(&disc, &params.material);
        if was_active {
            injected += disc.dt * power;
            let gained = e - previous;
            assert!(
                (gained - disc.dt * power).abs() <= 1e-9 * e,
                "step {} gained {gained}, expected {}",
                grid.step_count(),
                disc.dt * power
            );
        } else {
            assert!((e - previous).abs() <= 1e-9 * e, "energy drifted after window closed");
        }
        previous = e;
    }
    let total = grid.thermal_energy(&disc, &params.material) - e0;
    assert!((total - injected).abs() <= 1e-6 * injected);
}

#[test]
fn convection_loses_energy_monotonically() {
    let mut params = small_plate(10, 200.0);
    params.initial_offset_k = 5.0;
    params.heater.window = ActiveWindow::never();
    let (disc, mut grid, mut stepper) = setup(&params);
    let mut previous = grid.thermal_energy(&disc, &params.material);
    for _ in 0..200 {
        stepper.step(&mut grid);
        let e = grid.thermal_energy(&disc, &params.material);
        assert!(e < previous);
        previous = e;
    }
}

#[test]
fn steady_state_peak_sits_on_source_cell() {
    let params = small_plate(11, 3000.0);
    let (disc, mut grid, mut stepper) = setup(&params);
    stepper.run(&mut grid, disc.nt);

    let snap = Snapshot::capture(&grid);
    let source = disc.cell_index(params.heater.position);
    let peak = snap.temperature(source);
    for (q, &t) in snap.temperatures().iter().enumerate() {
        if q != source.flat(disc.ny) {
            assert!(t < peak, "cell {q} at {t} K not below source {peak} K");
        }
    }
    assert!(peak > grid.ambient_k());
}

#[test]
fn centred_source_gives_symmetric_field() {
    let n = 11;
    let params = centered_square_plate(n, 400.0);
    let (disc, mut grid, mut stepper) = setup(&params);
    assert_eq!((disc.nx, disc.ny), (n, n));
    assert_eq!(
        disc.cell_index(params.heater.position),
        thermoplate_core::CellIndex::new(n / 2, n / 2)
    );
    stepper.run(&mut grid, disc.nt);

    let t = |i: usize, j: usize| grid.temperatures()[i * n + j];
    let scale = t(n / 2, n / 2) - grid.ambient_k();
    let tol = 1e-9 * scale;
    for i in 0..n {
        for j in 0..n {
            let v = t(i, j);
            assert!((v - t(n - 1 - i, j)).abs() <= tol, "mirror x at ({i},{j})");
            assert!((v - t(i, n - 1 - j)).abs() <= tol, "mirror y at ({i},{j})");
            assert!((v - t(j, i)).abs() <= tol, "transpose at ({i},{j})");
        }
    }
}

#[test]
fn restart_reproduces_snapshot() {
    let mut params = small_plate(15, 60.0);
    params.perturbation.magnitude_w = 0.2;
    params.perturbation.window = ActiveWindow::new(5.0, 30.0);
    let disc = Discretization::derive(&params).unwrap();
    let steps = disc.nt / 2;

    let mut first = Grid::new(&params, &disc);
    let mut stepper = Stepper::new(&params, &disc);
    stepper.run(&mut first, steps);
    let snap = Snapshot::capture(&first);
    // Keep going: the snapshot must not be affected.
    stepper.run(&mut first, 10);

    let mut second = Grid::new(&params, &disc);
    Stepper::new(&params, &disc).run(&mut second, steps);
    assert_eq!(snap, Snapshot::capture(&second));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn idle_insulated_plate_conserves_energy(n in 1usize..16, steps in 1u64..400) {
        let params = insulated_plate(n, 1000.0);
        let (disc, mut grid, mut stepper) = setup(&params);
        let e0 = grid.thermal_energy(&disc, &params.material);
        stepper.run(&mut grid, steps);
        let e = grid.thermal_energy(&disc, &params.material);
        prop_assert!((e - e0).abs() <= 1e-12 * e0);
    }

    #[test]
    fn heated_then_idle_plate_conserves_energy(
        n in 2usize..14,
        on_steps in 1u64..200,
        off_steps in 1u64..200,
    ) {
        let mut params = insulated_plate(n, 5000.0);
        let disc = Discretization::derive(&params).unwrap();
        params.heater.window = ActiveWindow::new(0.0, (on_steps as f64 - 0.5) * disc.dt);
        let (disc, mut grid, mut stepper) = setup(&params);

        stepper.run(&mut grid, on_steps);
        let heated = grid.thermal_energy(&disc, &params.material);
        let e0 = {
            let fresh = Grid::new(&params, &disc);
            fresh.thermal_energy(&disc, &params.material)
        };
        let injected = on_steps as f64 * disc.dt * params.heater.magnitude_w;
        prop_assert!((heated - e0 - injected).abs() <= 1e-9 * heated);

        stepper.run(&mut grid, off_steps);
        let after = grid.thermal_energy(&disc, &params.material);
        prop_assert!((after - heated).abs() <= 1e-9 * heated);
    }

    #[test]
    fn time_never_drifts(n in 1usize..12, steps in 0u64..2000) {
        let params = small_plate(n, 10_000.0);
        let (disc, mut grid, mut stepper) = setup(&params);
        stepper.run(&mut grid, steps);
        prop_assert_eq!(grid.current_time(), steps as f64 * disc.dt);
    }

    #[test]
    fn kernels_agree_on_whole_runs(n in 1usize..12, steps in 1u64..60, offset in 0.0f64..20.0) {
        let mut params = small_plate(n, 1000.0);
        params.initial_offset_k = offset;
        params.perturbation.magnitude_w = 0.7;
        params.perturbation.window = ActiveWindow::new(0.0, 1000.0);
        let disc = Discretization::derive(&params).unwrap();
        let [sliced, per_cell] = StencilKernel::ALL.map(|kernel| {
            let mut grid = Grid::new(&params, &disc);
            Stepper::new(&params, &disc).with_kernel(kernel).run(&mut grid, steps);
            grid.temperatures().iter().map(|t| t.to_bits()).collect::<Vec<_>>()
        });
        prop_assert_eq!(sliced, per_cell);
    }
}
