//! In-memory `Write` sinks for recorder tests.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A clonable byte buffer. The recorder thread writes through one clone
/// while the test inspects another.
#[derive(Clone, Default)]
pub struct SharedSink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as UTF-8.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Non-empty lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl Write for SharedSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Accepts `budget` bytes, then fails every write and flush.
pub struct FailingSink {
    budget: usize,
    written: Arc<AtomicUsize>,
}

impl FailingSink {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            written: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bytes accepted before failing.
    pub fn written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }
}

impl Write for FailingSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let used = self.written.load(Ordering::Relaxed);
        if used + data.len() > self.budget {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "sink full"));
        }
        self.written.fetch_add(data.len(), Ordering::Relaxed);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.written.load(Ordering::Relaxed) >= self.budget {
            Err(io::Error::new(io::ErrorKind::StorageFull, "sink full"))
        } else {
            Ok(())
        }
    }
}
