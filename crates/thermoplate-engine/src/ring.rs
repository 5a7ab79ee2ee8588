//! Fixed-capacity ring of published snapshots.
//!
//! [`SnapshotRing`] stores `Arc<Snapshot>` slots with single-producer push
//! and multi-consumer read. The stepping owner publishes into it between
//! batches; renderers, the recorder and any other observer read the latest
//! entry whenever they like. Publication never waits for a consumer: a slow
//! reader simply finds a newer snapshot next time it looks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thermoplate_core::Snapshot;

/// A tagged slot: the `u64` is the monotonic write position at which the
/// snapshot was stored, so readers can detect an overwrite.
type Slot = Option<(u64, Arc<Snapshot>)>;

/// A fixed-capacity ring buffer of `Arc<Snapshot>`.
///
/// Single-producer: only the stepping owner calls [`push`](Self::push).
/// Multi-consumer: any thread can call [`latest`](Self::latest) or
/// [`get_by_pos`](Self::get_by_pos).
///
/// The write position increases monotonically and never wraps; slot index
/// is `pos % capacity`. Because the producer publishes snapshots in step
/// order, successive calls to `latest` from one thread never go back in
/// simulated time.
pub struct SnapshotRing {
    slots: Vec<Mutex<Slot>>,
    write_pos: AtomicU64,
    capacity: usize,
}

// Compile-time assertion: SnapshotRing must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SnapshotRing>();
};

impl SnapshotRing {
    /// Create a ring with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`. [`DriverConfig::validate`] rejects such
    /// a capacity before any ring is built.
    ///
    /// [`DriverConfig::validate`]: crate::DriverConfig::validate
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "SnapshotRing capacity must be >= 2, got {capacity}");
        let slots = (0..capacity).map(|_| Mutex::new(None)).collect();
        Self {
            slots,
            write_pos: AtomicU64::new(0),
            capacity,
        }
    }

    /// Publish a snapshot. Single-producer only.
    ///
    /// Returns the snapshot evicted from the reused slot, if any.
    pub fn push(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        let pos = self.write_pos.load(Ordering::Relaxed);
        let slot_idx = (pos as usize) % self.capacity;

        let arc = Arc::new(snapshot);
        let evicted = {
            let mut slot = self.slots[slot_idx]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let prev = slot.take().map(|(_tag, arc)| arc);
            *slot = Some((pos, arc));
            prev
        };

        // Release-store: the slot contents are visible before readers
        // observe the new position.
        self.write_pos.store(pos + 1, Ordering::Release);

        evicted
    }

    /// The most recently published snapshot, or `None` before the first
    /// push.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        loop {
            let pos = self.write_pos.load(Ordering::Acquire);
            if pos == 0 {
                return None;
            }
            if let Some(snap) = self.get_by_pos(pos - 1) {
                return Some(snap);
            }
            // The producer lapped the slot between our position read and
            // the lock. A newer position is now visible; try again.
        }
    }

    /// The snapshot stored at write position `pos`.
    ///
    /// Returns `None` if the position has not been written yet or has
    /// already been overwritten.
    pub fn get_by_pos(&self, pos: u64) -> Option<Arc<Snapshot>> {
        let current = self.write_pos.load(Ordering::Acquire);
        if pos >= current {
            return None;
        }
        if current - pos > self.capacity as u64 {
            return None;
        }

        let slot_idx = (pos as usize) % self.capacity;
        let slot = self.slots[slot_idx]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some((tag, arc)) if *tag == pos => Some(Arc::clone(arc)),
            _ => None,
        }
    }

    /// Number of snapshots currently retained (up to `capacity`).
    pub fn len(&self) -> usize {
        let pos = self.write_pos.load(Ordering::Acquire);
        pos.min(self.capacity as u64) as usize
    }

    /// Whether nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.write_pos.load(Ordering::Acquire) == 0
    }

    /// The ring capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The monotonic write position: the number of snapshots ever pushed.
    pub fn write_pos(&self) -> u64 {
        self.write_pos.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SnapshotRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotRing")
            .field("capacity", &self.capacity)
            .field("write_pos", &self.write_pos())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermoplate_core::{Discretization, Grid};
    use thermoplate_test_utils::small_plate;

    /// A snapshot whose step counter reads `steps`.
    fn make_snapshot(steps: u64) -> Snapshot {
        let params = small_plate(4, 1000.0);
        let disc = Discretization::derive(&params).unwrap();
        let mut grid = Grid::new(&params, &disc);
        let mut scratch = grid.temperatures().to_vec();
        for _ in 0..steps {
            grid.commit_step(&mut scratch, 0.0, 0.0);
        }
        Snapshot::capture(&grid)
    }

    #[test]
    fn new_ring_is_empty() {
        let ring = SnapshotRing::new(4);
        assert_eq!(ring.len(), 0);
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.write_pos(), 0);
        assert!(ring.latest().is_none());
    }

    #[test]
    fn push_then_latest() {
        let ring = SnapshotRing::new(4);
        ring.push(make_snapshot(1));
        assert_eq!(ring.len(), 1);
        assert!(!ring.is_empty());
        assert_eq!(ring.latest().unwrap().step(), 1);
    }

    #[test]
    fn eviction_returns_oldest() {
        let ring = SnapshotRing::new(4);
        for i in 1..=4 {
            assert!(ring.push(make_snapshot(i)).is_none());
        }
        assert_eq!(ring.len(), 4);

        let evicted = ring.push(make_snapshot(5));
        assert_eq!(evicted.map(|s| s.step()), Some(1));
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn latest_is_newest() {
        let ring = SnapshotRing::new(3);
        for i in 1..=10 {
            ring.push(make_snapshot(i));
        }
        assert_eq!(ring.latest().unwrap().step(), 10);
        assert_eq!(ring.write_pos(), 10);
    }

    #[test]
    fn get_by_pos_within_window() {
        let ring = SnapshotRing::new(4);
        for i in 1..=4 {
            ring.push(make_snapshot(i));
        }
        assert_eq!(ring.get_by_pos(0).unwrap().step(), 1);
        assert_eq!(ring.get_by_pos(3).unwrap().step(), 4);
        assert!(ring.get_by_pos(4).is_none());
    }

    #[test]
    fn get_by_pos_evicted_is_none() {
        let ring = SnapshotRing::new(4);
        for i in 1..=8 {
            ring.push(make_snapshot(i));
        }
        assert!(ring.get_by_pos(0).is_none());
        assert!(ring.get_by_pos(3).is_none());
        assert_eq!(ring.get_by_pos(4).unwrap().step(), 5);
        assert_eq!(ring.get_by_pos(7).unwrap().step(), 8);
    }

    #[test]
    #[should_panic(expected = "capacity must be >= 2")]
    fn capacity_one_panics() {
        SnapshotRing::new(1);
    }

    #[test]
    fn concurrent_readers_never_see_time_go_back() {
        let ring = Arc::new(SnapshotRing::new(2));
        let snapshots: Vec<Snapshot> = (1..=200).map(make_snapshot).collect();

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let ring = Arc::clone(&ring);
                std::thread::spawn(move || {
                    let mut last = 0u64;
                    while last < 200 {
                        if let Some(snap) = ring.latest() {
                            let step = snap.step();
                            assert!(step >= last, "went back from {last} to {step}");
                            last = snap.step();
                        }
                    }
                })
            })
            .collect();

        for snap in snapshots {
            ring.push(snap);
        }
        for r in readers {
            r.join().unwrap();
        }
    }
}
