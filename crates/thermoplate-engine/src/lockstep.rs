//! Synchronous batch stepping on the caller's thread.
//!
//! [`LockstepRun`] applies the same batching as the background driver
//! (`round(batch_duration / dt)` steps per batch, the last batch clipped
//! at the end of the run) but returns each batch's snapshot directly.
//! Used for headless runs and for checking that the threaded driver
//! publishes exactly what a synchronous run computes.
//!
//! # Example
//!
//! ```ignore
//! let mut run = LockstepRun::new(params, &DriverConfig::default())?;
//! while let Some(batch) = run.step_batch() {
//!     println!("t = {:.1} s", batch.snapshot.time());
//! }
//! ```

use std::time::Instant;

use thermoplate_core::{PhysicalParameters, Snapshot};

use crate::config::{ConfigError, DriverConfig};
use crate::metrics::{BatchMetrics, RunMetrics};
use crate::plate::PlateEngine;

/// Result of one [`LockstepRun::step_batch`] call.
#[derive(Clone, Debug)]
pub struct BatchResult {
    /// State at the end of the batch.
    pub snapshot: Snapshot,
    /// Timing for the batch.
    pub metrics: BatchMetrics,
}

/// Single-threaded run that advances one batch per call.
///
/// Pacing in the [`DriverConfig`] is ignored: the caller owns the thread
/// and decides how fast to go.
#[derive(Debug)]
pub struct LockstepRun {
    engine: PlateEngine,
    steps_per_batch: u64,
    metrics: RunMetrics,
}

// Compile-time assertion: LockstepRun can move across threads.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<LockstepRun>();
};

impl LockstepRun {
    /// Build the engine from `params` and validate `config`.
    pub fn new(params: PhysicalParameters, config: &DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = PlateEngine::new(params)?;
        Self::from_engine(engine, config)
    }

    /// Drive an already-built engine.
    pub fn from_engine(engine: PlateEngine, config: &DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let steps_per_batch = config.steps_per_batch(engine.discretization().dt);
        Ok(Self {
            engine,
            steps_per_batch,
            metrics: RunMetrics::default(),
        })
    }

    /// Run one batch and return its snapshot, or `None` once the run is
    /// finished.
    pub fn step_batch(&mut self) -> Option<BatchResult> {
        if self.engine.is_finished() {
            return None;
        }
        let step_start = Instant::now();
        let steps = self.engine.run_batch(self.steps_per_batch);
        let step_us = step_start.elapsed().as_micros() as u64;

        let publish_start = Instant::now();
        let snapshot = self.engine.snapshot();
        let metrics = BatchMetrics {
            steps,
            sim_time: snapshot.time(),
            step_us,
            publish_us: publish_start.elapsed().as_micros() as u64,
        };
        self.metrics.record(&metrics);
        Some(BatchResult { snapshot, metrics })
    }

    /// Run every remaining batch, handing each snapshot to `on_batch`.
    ///
    /// Returns the final snapshot.
    pub fn run_to_completion(&mut self, mut on_batch: impl FnMut(&Snapshot)) -> Snapshot {
        while let Some(batch) = self.step_batch() {
            on_batch(&batch.snapshot);
        }
        self.engine.snapshot()
    }

    /// Steps per batch for this run.
    pub fn steps_per_batch(&self) -> u64 {
        self.steps_per_batch
    }

    /// Accumulated timing.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// The engine being driven.
    pub fn engine(&self) -> &PlateEngine {
        &self.engine
    }

    /// Give the engine back.
    pub fn into_engine(self) -> PlateEngine {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermoplate_test_utils::small_plate;

    fn config(batch_duration_s: f64) -> DriverConfig {
        DriverConfig {
            batch_duration_s,
            ..Default::default()
        }
    }

    #[test]
    fn batches_cover_the_run_exactly() {
        let mut run = LockstepRun::new(small_plate(8, 50.0), &config(2.0)).unwrap();
        let nt = run.engine().total_steps();
        let per_batch = run.steps_per_batch();

        let mut sizes = Vec::new();
        let mut times = Vec::new();
        while let Some(batch) = run.step_batch() {
            sizes.push(batch.metrics.steps);
            times.push(batch.snapshot.time());
        }

        assert_eq!(sizes.iter().sum::<u64>(), nt);
        let (last, full) = sizes.split_last().unwrap();
        assert!(full.iter().all(|&s| s == per_batch));
        assert!(*last >= 1 && *last <= per_batch);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(run.metrics().batches, sizes.len() as u64);
        assert_eq!(run.metrics().steps, nt);
        assert!(run.step_batch().is_none());
    }

    #[test]
    fn tiny_batches_still_make_progress() {
        let mut run = LockstepRun::new(small_plate(8, 5.0), &config(1e-9)).unwrap();
        assert_eq!(run.steps_per_batch(), 1);
        let batch = run.step_batch().unwrap();
        assert_eq!(batch.metrics.steps, 1);
        assert_eq!(batch.snapshot.step(), 1);
    }

    #[test]
    fn run_to_completion_matches_stepping_everything_at_once() {
        let params = small_plate(7, 30.0);
        let mut run = LockstepRun::new(params.clone(), &config(3.0)).unwrap();
        let mut seen = 0;
        let last = run.run_to_completion(|_| seen += 1);
        assert_eq!(seen, run.metrics().batches);

        let mut direct = PlateEngine::new(params).unwrap();
        let nt = direct.total_steps();
        direct.run_batch(nt);
        assert_eq!(last, direct.snapshot());
    }

    #[test]
    fn rejects_invalid_config() {
        let err = LockstepRun::new(small_plate(8, 5.0), &config(0.0)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidBatchDuration { value: 0.0 });
    }
}
