//! Thermoplate background driver with a live console view and a CSV log.
//!
//! Demonstrates:
//!   1. Starting a `SimulationDriver` paced at 50x real time
//!   2. Rendering the latest snapshot from the main thread while the
//!      driver steps in the background
//!   3. Recording thermistor rows to a file with a `Recorder`
//!   4. Cancelling early and collecting the `DriverReport`
//!
//! Run with:
//!   cargo run --example realtime -- [log.csv]

use std::error::Error;
use std::time::Duration;

use thermoplate_core::{PhysicalParameters, ScaleTracker, Snapshot};
use thermoplate_engine::{create_log, DriverConfig, Recorder, RecorderConfig, SimulationDriver};

/// Shades from cold to hot.
const RAMP: &[u8] = b" .:-=+*#%@";

fn render(snapshot: &Snapshot, scale: (f64, f64)) -> String {
    let (lo, hi) = scale;
    let span = (hi - lo).max(1e-9);
    let (nx, ny) = (snapshot.nx(), snapshot.ny());
    // Coarse view: at most 60 columns along the length, 15 rows across.
    let step_i = nx.div_ceil(60).max(1);
    let step_j = ny.div_ceil(15).max(1);
    let mut out = String::new();
    for j in (0..ny).step_by(step_j) {
        for i in (0..nx).step_by(step_i) {
            let t = snapshot.celsius(thermoplate_core::CellIndex::new(i, j));
            let level = (((t - lo) / span) * (RAMP.len() - 1) as f64).round() as usize;
            out.push(RAMP[level.min(RAMP.len() - 1)] as char);
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    let log_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "thermoplate_log.csv".to_string());

    let params = PhysicalParameters {
        total_time_s: 600.0,
        ..Default::default()
    };
    let config = DriverConfig {
        batch_duration_s: 2.0,
        pacing: Some(50.0),
        ..Default::default()
    };
    let driver = SimulationDriver::start(params.clone(), config)?;

    let thermistors = thermoplate_engine::PlateEngine::new(params)?
        .thermistors()
        .clone();
    let recorder = Recorder::start(
        driver.ring(),
        thermistors,
        create_log(&log_path)?,
        RecorderConfig {
            interval: Duration::from_millis(200),
            write_header: true,
        },
    )?;

    // Watch for five seconds of wall time (250 s simulated), then stop.
    let mut scale = ScaleTracker::new();
    for _ in 0..10 {
        if driver.wait_timeout(Duration::from_millis(500)).is_some() {
            break;
        }
        if let Some(snap) = driver.latest() {
            let range = scale.observe(&snap).unwrap_or((0.0, 1.0));
            println!(
                "t = {:6.1} s   {:.3} .. {:.3} °C   rows logged: {}",
                snap.time(),
                range.0,
                range.1,
                recorder.rows_written()
            );
            print!("{}", render(&snap, range));
        }
    }

    let report = driver.stop()?;
    let log = recorder.stop()?;
    println!(
        "{:?} after {} steps ({:.1} s simulated); {} rows written to {}",
        report.outcome, report.steps, report.sim_time, log.rows, log_path
    );
    Ok(())
}
