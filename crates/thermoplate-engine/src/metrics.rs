//! Per-batch and per-run timing.
//!
//! [`BatchMetrics`] is filled in for every published batch; [`RunMetrics`]
//! accumulates them over a run and is returned in the final report.

/// Timing for one published batch.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchMetrics {
    /// Steps executed in the batch.
    pub steps: u64,
    /// Simulated time at the end of the batch, in seconds.
    pub sim_time: f64,
    /// Wall-clock time spent stepping, in microseconds.
    pub step_us: u64,
    /// Wall-clock time spent copying and publishing the snapshot, in
    /// microseconds.
    pub publish_us: u64,
}

/// Totals over every batch of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Batches published, not counting the initial snapshot.
    pub batches: u64,
    /// Steps executed.
    pub steps: u64,
    /// Total wall-clock stepping time, in microseconds.
    pub step_us: u64,
    /// Total wall-clock publication time, in microseconds.
    pub publish_us: u64,
    /// Slowest single batch (stepping plus publication), in microseconds.
    pub max_batch_us: u64,
    /// The most recent batch.
    pub last: BatchMetrics,
}

impl RunMetrics {
    /// Fold one batch into the totals.
    pub fn record(&mut self, batch: &BatchMetrics) {
        self.batches += 1;
        self.steps += batch.steps;
        self.step_us += batch.step_us;
        self.publish_us += batch.publish_us;
        self.max_batch_us = self.max_batch_us.max(batch.step_us + batch.publish_us);
        self.last = batch.clone();
    }

    /// Mean stepping cost per step, in microseconds. `None` before the
    /// first step.
    pub fn mean_step_us(&self) -> Option<f64> {
        (self.steps > 0).then(|| self.step_us as f64 / self.steps as f64)
    }
}
