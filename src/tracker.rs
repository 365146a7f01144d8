use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// Host-assigned identity of a [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackerId(u64);

impl TrackerId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The single counter a history plants in the host's undo system.
///
/// The history writes its undo depth into the tracker around every recorded
/// checkpoint. The host snapshots that value and rolls it back or forward as
/// part of its own undo/redo, so after a host notification the index tells the
/// history where the host moved to.
///
/// Clones share the same index. Only the owning history sets it; a host can
/// merely capture a [`TrackerSnapshot`] and later put it back.
#[derive(Clone)]
pub struct Tracker {
    id: TrackerId,
    index: Arc<AtomicUsize>,
}

impl Tracker {
    #[must_use]
    pub fn new(id: TrackerId) -> Self {
        Self {
            id,
            index: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn id(&self) -> TrackerId {
        self.id
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    pub(crate) fn set_index(&self, index: usize) {
        self.index.store(index, Ordering::Release);
    }

    /// Captures the current index for a host checkpoint.
    #[must_use]
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot(self.index())
    }

    /// Rolls the index back or forward to a previously captured snapshot.
    pub fn restore(&self, snapshot: TrackerSnapshot) {
        self.set_index(snapshot.0);
    }
}

/// Opaque value of a [`Tracker`] as persisted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSnapshot(usize);

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("id", &self.id)
            .field("index", &self.index())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_at_zero() {
        let tracker = Tracker::new(TrackerId::new(1));
        assert_eq!(tracker.id(), TrackerId::new(1));
        assert_eq!(tracker.index(), 0);
    }

    #[test]
    fn test_clones_share_index() {
        let tracker = Tracker::new(TrackerId::new(3));
        let host_copy = tracker.clone();

        tracker.set_index(4);
        assert_eq!(host_copy.index(), 4);

        host_copy.set_index(2);
        assert_eq!(tracker.index(), 2);
    }

    #[test]
    fn test_snapshot_restore() {
        let tracker = Tracker::new(TrackerId::new(2));
        tracker.set_index(3);
        let checkpoint = tracker.snapshot();

        tracker.set_index(8);
        tracker.clone().restore(checkpoint);
        assert_eq!(tracker.index(), 3);
    }

    #[test]
    fn test_debug() {
        let tracker = Tracker::new(TrackerId::new(9));
        tracker.set_index(5);
        assert_eq!(
            format!("{tracker:?}"),
            "Tracker { id: TrackerId(9), index: 5 }"
        );
    }
}
