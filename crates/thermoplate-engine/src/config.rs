//! Run configuration and the errors raised while starting a run.
//!
//! [`DriverConfig`] controls batching and publication for both
//! [`LockstepRun`](crate::LockstepRun) and
//! [`SimulationDriver`](crate::SimulationDriver). [`RecorderConfig`]
//! controls the log sampler. Both are validated once, before any thread
//! is spawned.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use thermoplate_core::ParameterError;

/// Simulated seconds of progress between publications, by default.
pub const DEFAULT_BATCH_DURATION_S: f64 = 1.0;

/// Snapshot ring slots, by default.
pub const DEFAULT_RING_CAPACITY: usize = 8;

/// Wall-clock interval between recorder samples, by default.
pub const DEFAULT_RECORD_INTERVAL: Duration = Duration::from_secs(1);

/// Slowest accepted pacing: one simulated millisecond per wall second.
pub const MIN_PACING: f64 = 1e-3;

/// Longest accepted interval between recorder samples.
pub const MAX_RECORD_INTERVAL: Duration = Duration::from_secs(3600);

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected before a run starts, or while recovering its threads.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The physical parameters were rejected.
    Parameters(ParameterError),
    /// `batch_duration_s` is NaN, infinite, zero, or negative.
    InvalidBatchDuration {
        /// The invalid value.
        value: f64,
    },
    /// Ring capacity is below the minimum of 2.
    RingTooSmall {
        /// The configured capacity.
        configured: usize,
    },
    /// Pacing factor is not finite or is below [`MIN_PACING`].
    InvalidPacing {
        /// The invalid value.
        value: f64,
    },
    /// Recorder interval is zero or longer than [`MAX_RECORD_INTERVAL`].
    InvalidRecorderInterval,
    /// A background thread could not be spawned.
    ThreadSpawnFailed {
        /// Which thread failed, and why.
        reason: String,
    },
    /// The engine could not be recovered from the driver thread (it
    /// panicked).
    EngineRecoveryFailed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameters(e) => write!(f, "parameters: {e}"),
            Self::InvalidBatchDuration { value } => {
                write!(f, "batch_duration_s must be finite and positive, got {value}")
            }
            Self::RingTooSmall { configured } => {
                write!(f, "ring_capacity {configured} is below minimum of 2")
            }
            Self::InvalidPacing { value } => {
                write!(f, "pacing must be finite and at least {MIN_PACING}, got {value}")
            }
            Self::InvalidRecorderInterval => write!(
                f,
                "recorder interval must be non-zero and at most {}s",
                MAX_RECORD_INTERVAL.as_secs()
            ),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::EngineRecoveryFailed => {
                write!(f, "engine could not be recovered from driver thread")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parameters(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParameterError> for ConfigError {
    fn from(e: ParameterError) -> Self {
        Self::Parameters(e)
    }
}

// ── DriverConfig ───────────────────────────────────────────────────

/// Batching, publication and pacing for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Simulated seconds to advance between two published snapshots.
    pub batch_duration_s: f64,
    /// Number of recent snapshots retained for consumers.
    pub ring_capacity: usize,
    /// Optional real-time factor, in simulated seconds per wall second.
    /// `None` runs as fast as the machine allows.
    pub pacing: Option<f64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            batch_duration_s: DEFAULT_BATCH_DURATION_S,
            ring_capacity: DEFAULT_RING_CAPACITY,
            pacing: None,
        }
    }
}

impl DriverConfig {
    /// Check every invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.batch_duration_s.is_finite() || self.batch_duration_s <= 0.0 {
            return Err(ConfigError::InvalidBatchDuration {
                value: self.batch_duration_s,
            });
        }
        if self.ring_capacity < 2 {
            return Err(ConfigError::RingTooSmall {
                configured: self.ring_capacity,
            });
        }
        if let Some(factor) = self.pacing {
            // The reciprocal scales a wall-clock wait.
            if !factor.is_finite() || factor < MIN_PACING {
                return Err(ConfigError::InvalidPacing { value: factor });
            }
        }
        Ok(())
    }

    /// Steps per batch for a time step of `dt`: `round(batch / dt)`, and
    /// never fewer than one.
    pub fn steps_per_batch(&self, dt: f64) -> u64 {
        let steps = (self.batch_duration_s / dt).round();
        if steps >= 1.0 {
            steps as u64
        } else {
            1
        }
    }
}

// ── RecorderConfig ─────────────────────────────────────────────────

/// Sampling cadence and header policy for the log recorder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Wall-clock time between samples.
    pub interval: Duration,
    /// Write the column header before the first row.
    pub write_header: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RECORD_INTERVAL,
            write_header: true,
        }
    }
}

impl RecorderConfig {
    /// Check every invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() || self.interval > MAX_RECORD_INTERVAL {
            return Err(ConfigError::InvalidRecorderInterval);
        }
        Ok(())
    }
}
