//! User-facing [`SimulationDriver`] API.
//!
//! The plate engine runs on a dedicated background thread, publishing one
//! snapshot per batch into a [`SnapshotRing`]. Consumers never block the
//! stepper and the stepper never waits for them.
//!
//! # Architecture
//!
//! ```text
//! Caller                      Driver thread                 Readers (any)
//!   |                              |                              |
//!   |--start()-------------------->| ring.push(initial)           |
//!   |                              | loop:                        |
//!   |                              |   finished? cancelled?       |
//!   |                              |   engine.run_batch(n)        |
//!   |                              |   ring.push(snapshot)  ----->| ring.latest()
//!   |                              |   pace (wait on token)       |
//!   |--cancel()--> token --------->|                              |
//!   |<--completion: RunOutcome-----|                              |
//!   |--join()--------------------->| returns engine + metrics     |
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use thermoplate_core::{PhysicalParameters, Snapshot};

use crate::cancel::CancelToken;
use crate::config::{ConfigError, DriverConfig};
use crate::driver_thread::{DriverExit, DriverThreadState, RunOutcome};
use crate::metrics::RunMetrics;
use crate::plate::PlateEngine;
use crate::ring::SnapshotRing;

// ── DriverReport ─────────────────────────────────────────────────

/// Final account of a run, returned by [`SimulationDriver::join`] and
/// [`SimulationDriver::stop`].
#[derive(Debug)]
pub struct DriverReport {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Steps executed.
    pub steps: u64,
    /// Simulated time reached, in seconds.
    pub sim_time: f64,
    /// Batch timing over the run.
    pub metrics: RunMetrics,
    /// The engine, in its final state. A new run starts from parameters,
    /// or after [`PlateEngine::reset`].
    pub engine: PlateEngine,
}

impl From<DriverExit> for DriverReport {
    fn from(exit: DriverExit) -> Self {
        Self {
            outcome: exit.outcome,
            steps: exit.engine.steps_done(),
            sim_time: exit.engine.current_time(),
            metrics: exit.metrics,
            engine: exit.engine,
        }
    }
}

// ── SimulationDriver ─────────────────────────────────────────────

/// Runs a plate simulation on a background thread.
///
/// Dropping the driver cancels the run and joins the thread.
pub struct SimulationDriver {
    ring: Arc<SnapshotRing>,
    cancel: CancelToken,
    done_rx: Receiver<RunOutcome>,
    thread: Option<JoinHandle<DriverExit>>,
    dt: f64,
    total_steps: u64,
    steps_per_batch: u64,
}

// Compile-time assertion: the driver handle can be shared with readers.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SimulationDriver>();
};

impl SimulationDriver {
    /// Validate everything, build the engine and start stepping.
    pub fn start(params: PhysicalParameters, config: DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = PlateEngine::new(params)?;
        Self::start_engine(engine, config)
    }

    /// Start stepping an already-built engine from wherever it stands.
    pub fn start_engine(engine: PlateEngine, config: DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dt = engine.discretization().dt;
        let total_steps = engine.total_steps();
        let steps_per_batch = config.steps_per_batch(dt);

        let ring = Arc::new(SnapshotRing::new(config.ring_capacity));
        let cancel = CancelToken::new();
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        tracing::info!(
            nx = engine.discretization().nx,
            ny = engine.discretization().ny,
            dt,
            total_steps,
            steps_per_batch,
            pacing = ?config.pacing,
            "starting simulation driver"
        );

        let state = DriverThreadState::new(
            engine,
            Arc::clone(&ring),
            cancel.clone(),
            done_tx,
            steps_per_batch,
            config.pacing,
        );
        let thread = thread::Builder::new()
            .name("thermoplate-driver".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("driver thread: {e}"),
            })?;

        Ok(Self {
            ring,
            cancel,
            done_rx,
            thread: Some(thread),
            dt,
            total_steps,
            steps_per_batch,
        })
    }

    /// The most recently published snapshot.
    ///
    /// `None` only in the instant between spawn and the initial
    /// publication.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.ring.latest()
    }

    /// A handle to the snapshot ring, for consumers that outlive a borrow
    /// of the driver (the recorder, a renderer thread).
    pub fn ring(&self) -> Arc<SnapshotRing> {
        Arc::clone(&self.ring)
    }

    /// A clone of the run's cancel token.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Ask the driver to stop after the batch in progress.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Channel that yields the run's outcome once, when the loop exits.
    ///
    /// Suitable for `crossbeam_channel::select!` alongside other events.
    pub fn completion(&self) -> &Receiver<RunOutcome> {
        &self.done_rx
    }

    /// Wait up to `timeout` for the run to end.
    ///
    /// Returns the outcome if the loop exited in time. The outcome is
    /// delivered once; later calls return `None`, but [`join`](Self::join)
    /// still reports it.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<RunOutcome> {
        match self.done_rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Whether the driver thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Time step of the run, in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Total steps in the run.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Steps between publications.
    pub fn steps_per_batch(&self) -> u64 {
        self.steps_per_batch
    }

    /// Block until the run ends on its own, then recover the engine.
    pub fn join(mut self) -> Result<DriverReport, ConfigError> {
        self.join_thread()
    }

    /// Cancel, then join.
    pub fn stop(mut self) -> Result<DriverReport, ConfigError> {
        self.cancel.cancel();
        self.join_thread()
    }

    fn join_thread(&mut self) -> Result<DriverReport, ConfigError> {
        let handle = self.thread.take().ok_or(ConfigError::EngineRecoveryFailed)?;
        let exit = handle
            .join()
            .map_err(|_| ConfigError::EngineRecoveryFailed)?;
        let report = DriverReport::from(exit);
        match report.outcome {
            RunOutcome::Completed => tracing::info!(
                steps = report.steps,
                sim_time = report.sim_time,
                batches = report.metrics.batches,
                "simulation completed"
            ),
            RunOutcome::Cancelled => tracing::warn!(
                steps = report.steps,
                total_steps = self.total_steps,
                sim_time = report.sim_time,
                "simulation cancelled before completion"
            ),
        }
        Ok(report)
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            self.cancel.cancel();
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for SimulationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationDriver")
            .field("dt", &self.dt)
            .field("total_steps", &self.total_steps)
            .field("steps_per_batch", &self.steps_per_batch)
            .field("published", &self.ring.write_pos())
            .field("running", &!self.is_finished())
            .finish()
    }
}
