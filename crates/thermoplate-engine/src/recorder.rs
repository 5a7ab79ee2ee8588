//! Low-frequency sampling of published snapshots into a delimited log.
//!
//! The [`Recorder`] runs on its own thread and only ever reads the
//! [`SnapshotRing`]. On a fixed wall-clock interval it takes the latest
//! snapshot and, if its simulated time is newer than the last row written,
//! appends one row:
//!
//! ```text
//! time,power,perturbation,t1,t2,t3
//! 12.5,1.0712,0,23.81,23.80,23.80
//! ```
//!
//! Temperatures are in degrees Celsius. Every row is flushed as it is
//! written. I/O failures stop the recorder, never the simulation: the
//! first error is kept and returned from [`Recorder::stop`].

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thermoplate_core::{
    ParameterError, Readings, Snapshot, ThermistorArray, TraceSample, THERMISTOR_COUNT,
};

use crate::cancel::CancelToken;
use crate::config::{ConfigError, RecorderConfig};
use crate::ring::SnapshotRing;

// ── RecordError ──────────────────────────────────────────────────

/// A failure while creating, appending to, or flushing the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordError {
    /// Kind of the underlying I/O error.
    pub kind: io::ErrorKind,
    /// What the recorder was doing, and the I/O error text.
    pub message: String,
}

impl RecordError {
    fn io(context: &str, err: &io::Error) -> Self {
        Self {
            kind: err.kind(),
            message: format!("{context}: {err}"),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recorder: {}", self.message)
    }
}

impl Error for RecordError {}

// ── Traces ───────────────────────────────────────────────────────

/// One logged row, kept in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRow {
    /// Heater power at the sampled instant, in W.
    pub power: f64,
    /// Perturbation power at the sampled instant, in W.
    pub perturbation: f64,
    /// Simulated time and thermistor readings.
    pub sample: TraceSample,
}

/// Every row the recorder wrote, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Traces {
    /// Thermistor names, in column order.
    pub names: Vec<String>,
    /// Rows, strictly increasing in time.
    pub rows: Vec<TraceRow>,
}

impl Traces {
    /// `(time, °C)` pairs for the thermistor called `name`.
    pub fn series(&self, name: &str) -> Option<Vec<(f64, f64)>> {
        let col = self.names.iter().position(|n| n == name)?;
        Some(
            self.rows
                .iter()
                .map(|r| (r.sample.time, r.sample.celsius[col]))
                .collect(),
        )
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was written.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What the recorder produced, returned by [`Recorder::stop`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecorderReport {
    /// Rows written (excluding the header).
    pub rows: u64,
    /// The same rows, in memory.
    pub traces: Traces,
}

// ── Recorder ─────────────────────────────────────────────────────

/// Handle to a running recorder thread.
///
/// Dropping the handle stops the recorder and flushes the log, discarding
/// the report.
pub struct Recorder {
    stop: CancelToken,
    rows: Arc<AtomicU64>,
    failed: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<RecorderReport, RecordError>>>,
}

/// Open `path` for a fresh log, truncating any existing file.
pub fn create_log(path: impl AsRef<Path>) -> Result<File, RecordError> {
    let path = path.as_ref();
    File::create(path).map_err(|e| RecordError::io(&format!("create {}", path.display()), &e))
}

impl Recorder {
    /// Start sampling `ring` into `sink`.
    ///
    /// The header and each row are flushed through to `sink` as soon as
    /// they are written. `thermistors` must hold exactly
    /// [`THERMISTOR_COUNT`] sites, one per log column.
    pub fn start<W>(
        ring: Arc<SnapshotRing>,
        thermistors: ThermistorArray,
        sink: W,
        config: RecorderConfig,
    ) -> Result<Self, ConfigError>
    where
        W: Write + Send + 'static,
    {
        config.validate()?;
        if thermistors.len() != THERMISTOR_COUNT {
            return Err(ParameterError::ThermistorCount {
                configured: thermistors.len(),
                required: THERMISTOR_COUNT,
            }
            .into());
        }
        let stop = CancelToken::new();
        let rows = Arc::new(AtomicU64::new(0));
        let failed = Arc::new(AtomicBool::new(false));

        let worker = RecorderThread {
            ring,
            thermistors,
            sink: BufWriter::new(sink),
            config,
            stop: stop.clone(),
            rows: Arc::clone(&rows),
            failed: Arc::clone(&failed),
            last_time: None,
            traces: Traces::default(),
        };
        let thread = thread::Builder::new()
            .name("thermoplate-recorder".into())
            .spawn(move || worker.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("recorder thread: {e}"),
            })?;

        Ok(Self {
            stop,
            rows,
            failed,
            thread: Some(thread),
        })
    }

    /// Rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows.load(Ordering::Acquire)
    }

    /// Whether the recorder has hit an I/O error and stopped writing.
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Take a final sample, flush the log and return everything written.
    pub fn stop(mut self) -> Result<RecorderReport, RecordError> {
        self.stop.cancel();
        match self.thread.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(RecordError {
                    kind: io::ErrorKind::Other,
                    message: "recorder thread panicked".into(),
                })
            }),
            None => Ok(RecorderReport {
                rows: 0,
                traces: Traces::default(),
            }),
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            self.stop.cancel();
            let _ = handle.join();
        }
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("rows", &self.rows_written())
            .field("failed", &self.failed())
            .finish_non_exhaustive()
    }
}

// ── Recorder thread ──────────────────────────────────────────────

struct RecorderThread<W: Write> {
    ring: Arc<SnapshotRing>,
    thermistors: ThermistorArray,
    sink: BufWriter<W>,
    config: RecorderConfig,
    stop: CancelToken,
    rows: Arc<AtomicU64>,
    failed: Arc<AtomicBool>,
    last_time: Option<f64>,
    traces: Traces,
}

impl<W: Write> RecorderThread<W> {
    fn run(mut self) -> Result<RecorderReport, RecordError> {
        self.traces.names = self.thermistors.names().map(str::to_owned).collect();
        tracing::info!(
            interval_ms = self.config.interval.as_millis() as u64,
            columns = self.traces.names.len(),
            "recorder started"
        );

        let result = self.record_until_stopped();
        if let Err(err) = &result {
            self.failed.store(true, Ordering::Release);
            tracing::warn!(error = %err, rows = self.traces.len(), "recorder stopped on I/O error");
        } else {
            tracing::info!(rows = self.traces.len(), "recorder stopped");
        }
        result.map(|()| RecorderReport {
            rows: self.traces.len() as u64,
            traces: self.traces,
        })
    }

    fn record_until_stopped(&mut self) -> Result<(), RecordError> {
        if self.config.write_header {
            let header = header_line(&self.traces.names);
            writeln!(self.sink, "{header}").map_err(|e| RecordError::io("write header", &e))?;
            self.flush()?;
        }
        loop {
            self.sample()?;
            if self.stop.wait_timeout(self.config.interval) {
                break;
            }
        }
        // Catch whatever was published since the last tick.
        self.sample()?;
        self.flush()
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        self.sink
            .flush()
            .map_err(|e| RecordError::io("flush log", &e))
    }

    fn sample(&mut self) -> Result<(), RecordError> {
        let Some(snapshot) = self.ring.latest() else {
            return Ok(());
        };
        if self.last_time.is_some_and(|t| snapshot.time() <= t) {
            return Ok(());
        }
        let sample = self.thermistors.sample(&snapshot);
        let line = row_line(&snapshot, &sample.celsius);
        writeln!(self.sink, "{line}").map_err(|e| RecordError::io("append row", &e))?;
        // Each row is durable once sampled.
        self.flush()?;

        self.last_time = Some(snapshot.time());
        self.traces.rows.push(TraceRow {
            power: snapshot.power(),
            perturbation: snapshot.perturbation(),
            sample,
        });
        self.rows.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

fn header_line(names: &[String]) -> String {
    let mut line = String::from("time,power,perturbation");
    for name in names {
        line.push(',');
        line.push_str(name);
    }
    line
}

fn row_line(snapshot: &Snapshot, celsius: &Readings) -> String {
    let mut line = format!(
        "{},{},{}",
        snapshot.time(),
        snapshot.power(),
        snapshot.perturbation()
    );
    for t in celsius {
        line.push(',');
        line.push_str(&t.to_string());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use thermoplate_core::{Discretization, Grid};
    use thermoplate_test_utils::{small_plate, FailingSink, SharedSink};

    fn fast() -> RecorderConfig {
        RecorderConfig {
            interval: Duration::from_millis(2),
            write_header: true,
        }
    }

    /// A ring holding the initial state of an 8-cell default plate.
    fn seeded_ring() -> (Arc<SnapshotRing>, ThermistorArray) {
        let params = small_plate(8, 100.0);
        let disc = Discretization::derive(&params).unwrap();
        let grid = Grid::new(&params, &disc);
        let ring = Arc::new(SnapshotRing::new(4));
        ring.push(Snapshot::capture(&grid));
        (ring, ThermistorArray::from_params(&params, &disc))
    }

    #[test]
    fn header_lists_thermistors_in_order() {
        let names = vec!["t1".to_string(), "t2".to_string(), "t3".to_string()];
        assert_eq!(header_line(&names), "time,power,perturbation,t1,t2,t3");
    }

    #[test]
    fn unchanged_snapshot_is_written_once() {
        let (ring, thermistors) = seeded_ring();
        let sink = SharedSink::new();
        let recorder = Recorder::start(ring, thermistors, sink.clone(), fast()).unwrap();
        thread::sleep(Duration::from_millis(30));
        let report = recorder.stop().unwrap();

        assert_eq!(report.rows, 1);
        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "time,power,perturbation,t1,t2,t3");
        assert!(lines[1].starts_with("0,0,0,"));
        assert_eq!(lines[1].split(',').count(), 6);
    }

    #[test]
    fn readings_are_celsius() {
        let (ring, thermistors) = seeded_ring();
        let recorder = Recorder::start(ring, thermistors, io::sink(), fast()).unwrap();
        let report = recorder.stop().unwrap();
        let series = report.traces.series("t2").unwrap();
        assert_eq!(series, vec![(0.0, 25.0)]);
        assert!(report.traces.series("t9").is_none());
    }

    #[test]
    fn header_can_be_suppressed() {
        let (ring, thermistors) = seeded_ring();
        let sink = SharedSink::new();
        let config = RecorderConfig {
            write_header: false,
            ..fast()
        };
        Recorder::start(ring, thermistors, sink.clone(), config)
            .unwrap()
            .stop()
            .unwrap();
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].starts_with("time"));
    }

    #[test]
    fn empty_ring_writes_only_header() {
        let (_, thermistors) = seeded_ring();
        let sink = SharedSink::new();
        let empty = Arc::new(SnapshotRing::new(2));
        let report = Recorder::start(empty, thermistors, sink.clone(), fast())
            .unwrap()
            .stop()
            .unwrap();
        assert!(report.traces.is_empty());
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn io_failure_is_reported_on_stop() {
        let (ring, thermistors) = seeded_ring();
        let recorder = Recorder::start(ring, thermistors, FailingSink::new(0), fast()).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !recorder.failed() {
            assert!(std::time::Instant::now() < deadline, "failure not flagged");
            thread::sleep(Duration::from_millis(1));
        }
        let err = recorder.stop().unwrap_err();
        assert_eq!(err.kind, io::ErrorKind::StorageFull);
        assert!(err.to_string().starts_with("recorder: "));
    }

    #[test]
    fn rejects_zero_or_unbounded_interval() {
        for interval in [Duration::ZERO, Duration::MAX] {
            let (ring, thermistors) = seeded_ring();
            let config = RecorderConfig {
                interval,
                write_header: true,
            };
            assert!(matches!(
                Recorder::start(ring, thermistors, io::sink(), config),
                Err(ConfigError::InvalidRecorderInterval)
            ));
        }
    }

    #[test]
    fn rejects_wrong_column_count() {
        let (ring, _) = seeded_ring();
        assert_eq!(
            Recorder::start(Arc::clone(&ring), ThermistorArray::new(), io::sink(), fast())
                .unwrap_err(),
            ConfigError::Parameters(ParameterError::ThermistorCount {
                configured: 0,
                required: 3,
            })
        );

        let mut params = small_plate(8, 100.0);
        params.thermistors.clear();
        assert!(matches!(
            Discretization::derive(&params),
            Err(ParameterError::ThermistorCount { configured: 0, .. })
        ));
    }

    #[test]
    fn create_log_reports_missing_directory() {
        let path = std::env::temp_dir()
            .join("thermoplate-no-such-dir")
            .join("nested")
            .join("log.csv");
        let err = create_log(&path).unwrap_err();
        assert_eq!(err.kind, io::ErrorKind::NotFound);
    }
}
