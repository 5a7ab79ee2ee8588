//! Thermoplate lockstep run: heat a plate and print thermistor traces.
//!
//! Demonstrates:
//!   1. Describing a plate with `PhysicalParameters`
//!   2. Inspecting the derived discretization (mesh, `dt`, step count)
//!   3. Stepping batch by batch on the calling thread with `LockstepRun`
//!   4. Reading thermistors from each batch's snapshot
//!
//! Run with:
//!   cargo run --example quickstart

use thermoplate_core::{ActiveWindow, PhysicalParameters, PlatePoint, SourceDescriptor};
use thermoplate_engine::{ConfigError, DriverConfig, LockstepRun};

fn main() -> Result<(), ConfigError> {
    // ─── Plate ──────────────────────────────────────────────────
    //
    // Default 120 mm aluminium plate on a 40-cell mesh. The heater runs
    // for the first two minutes; a weaker perturbation kicks in at 60 s.
    let total_time_s = 300.0;
    let params = PhysicalParameters {
        mesh_resolution: 40,
        total_time_s,
        heater: SourceDescriptor {
            position: PlatePoint::new(30.0, 60.0),
            magnitude_w: 2.0,
            window: ActiveWindow::new(0.0, 120.0),
        },
        perturbation: SourceDescriptor {
            position: PlatePoint::new(90.0, 60.0),
            magnitude_w: 0.5,
            window: ActiveWindow::new(60.0, total_time_s),
        },
        ..Default::default()
    };

    let config = DriverConfig {
        batch_duration_s: 30.0,
        ..Default::default()
    };
    let mut run = LockstepRun::new(params, &config)?;

    let disc = run.engine().discretization();
    println!(
        "mesh {} x {}, dx = {:.2} mm, dt = {:.3} s, {} steps ({} per batch)",
        disc.nx,
        disc.ny,
        disc.dx * 1e3,
        disc.dt,
        disc.nt,
        run.steps_per_batch()
    );

    // ─── Batches ────────────────────────────────────────────────
    let names: Vec<String> = run.engine().thermistors().names().map(str::to_owned).collect();
    println!("{:>8} {:>7} {:>7}  {}", "time", "power", "pert", names.join("      "));
    while let Some(batch) = run.step_batch() {
        let snap = &batch.snapshot;
        let readings = run.engine().thermistors().read_celsius(snap);
        let cols: Vec<String> = readings.iter().map(|t| format!("{t:7.3}")).collect();
        println!(
            "{:>8.1} {:>7.3} {:>7.3}  {}",
            snap.time(),
            snap.power(),
            snap.perturbation(),
            cols.join(" ")
        );
    }

    let metrics = run.metrics();
    println!(
        "{} batches, {} steps, {:.2} us/step",
        metrics.batches,
        metrics.steps,
        metrics.mean_step_us().unwrap_or(0.0)
    );
    Ok(())
}
