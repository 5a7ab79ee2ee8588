//! The stepping loop run on the driver's background thread.
//!
//! The thread owns [`PlateEngine`] exclusively (moved in at spawn). No
//! locks on the hot path: it steps a batch, publishes one snapshot to the
//! ring, and checks the cancel token before starting the next batch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use crate::cancel::CancelToken;
use crate::metrics::{BatchMetrics, RunMetrics};
use crate::plate::PlateEngine;
use crate::ring::SnapshotRing;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run reached its end time.
    Completed,
    /// The run was cancelled before its end time.
    Cancelled,
}

/// Everything the thread hands back when it exits.
pub(crate) struct DriverExit {
    pub engine: PlateEngine,
    pub outcome: RunOutcome,
    pub metrics: RunMetrics,
}

/// State held by the driver thread's main loop.
pub(crate) struct DriverThreadState {
    engine: PlateEngine,
    ring: Arc<SnapshotRing>,
    cancel: CancelToken,
    done_tx: Sender<RunOutcome>,
    steps_per_batch: u64,
    pacing: Option<f64>,
}

impl DriverThreadState {
    pub fn new(
        engine: PlateEngine,
        ring: Arc<SnapshotRing>,
        cancel: CancelToken,
        done_tx: Sender<RunOutcome>,
        steps_per_batch: u64,
        pacing: Option<f64>,
    ) -> Self {
        Self {
            engine,
            ring,
            cancel,
            done_tx,
            steps_per_batch,
            pacing,
        }
    }

    /// Main loop. Runs until the engine finishes or the token is
    /// cancelled.
    ///
    /// Consumes self and returns the engine so the owner can inspect the
    /// final state through `JoinHandle<DriverExit>`.
    pub fn run(mut self) -> DriverExit {
        let started = Instant::now();
        let start_time = self.engine.current_time();
        let mut metrics = RunMetrics::default();

        // Consumers see the initial state before the first batch lands.
        self.ring.push(self.engine.snapshot());

        let outcome = loop {
            if self.engine.is_finished() {
                break RunOutcome::Completed;
            }
            if self.cancel.is_cancelled() {
                break RunOutcome::Cancelled;
            }

            // 1. Step one batch.
            let step_start = Instant::now();
            let steps = self.engine.run_batch(self.steps_per_batch);
            let step_us = step_start.elapsed().as_micros() as u64;

            // 2. Publish.
            let publish_start = Instant::now();
            let snapshot = self.engine.snapshot();
            let sim_time = snapshot.time();
            self.ring.push(snapshot);
            let batch = BatchMetrics {
                steps,
                sim_time,
                step_us,
                publish_us: publish_start.elapsed().as_micros() as u64,
            };
            metrics.record(&batch);
            tracing::debug!(
                steps,
                sim_time,
                step_us,
                publish_us = batch.publish_us,
                "published batch"
            );

            // 3. Hold back to the real-time factor, if any.
            if let Some(factor) = self.pacing {
                let wall_s = (sim_time - start_time).max(0.0) / factor;
                let target = Duration::try_from_secs_f64(wall_s).unwrap_or(Duration::MAX);
                if let Some(ahead) = target.checked_sub(started.elapsed()) {
                    self.cancel.wait_timeout(ahead);
                }
            }
        };

        // Best-effort: the driver handle may already be gone.
        let _ = self.done_tx.send(outcome);

        DriverExit {
            engine: self.engine,
            outcome,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use thermoplate_test_utils::small_plate;

    fn spawn_paced(
        factor: f64,
    ) -> (CancelToken, Arc<SnapshotRing>, thread::JoinHandle<DriverExit>) {
        let engine = PlateEngine::new(small_plate(6, 1e6)).unwrap();
        let steps_per_batch = (1.0 / engine.discretization().dt).round() as u64;
        let ring = Arc::new(SnapshotRing::new(4));
        let cancel = CancelToken::new();
        let (done_tx, _done_rx) = crossbeam_channel::bounded(1);
        let state = DriverThreadState::new(
            engine,
            Arc::clone(&ring),
            cancel.clone(),
            done_tx,
            steps_per_batch,
            Some(factor),
        );
        (cancel, ring, thread::spawn(move || state.run()))
    }

    #[test]
    fn extreme_pacing_wait_stays_cancellable() {
        // A wait far past any representable deadline.
        let (cancel, ring, handle) = spawn_paced(1e-19);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(ring.write_pos(), 2);
        cancel.cancel();
        let exit = handle.join().unwrap();
        assert_eq!(exit.outcome, RunOutcome::Cancelled);
        assert_eq!(exit.metrics.batches, 1);
    }
}
