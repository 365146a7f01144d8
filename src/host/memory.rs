use std::{
    collections::HashSet,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use parking_lot::Mutex;

use crate::{
    error::HostError,
    notifier::{Subscription, UndoCallback, UndoNotifier},
    tracker::{Tracker, TrackerId, TrackerSnapshot},
    traits::undo_host::UndoHost,
};

struct Record {
    tracker: Tracker,
    label: String,
    before: TrackerSnapshot,
    after: TrackerSnapshot,
}

#[derive(Default)]
struct HostState {
    undo: Vec<Record>,
    redo: Vec<Record>,
    live: HashSet<TrackerId>,
}

/// In-process [`UndoHost`] with its own undo/redo stacks of tracker snapshots.
///
/// It behaves like an editor's native undo system: each record captures the
/// tracker's index before the change, the index after the change is captured
/// when the record is undone, and every undo/redo fires one notification.
pub struct MemoryUndoHost {
    state: Mutex<HostState>,
    notifier: UndoNotifier,
    next_tracker: AtomicU64,
    max_trackers: Option<usize>,
    reject_records: AtomicBool,
}

impl MemoryUndoHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HostState::default()),
            notifier: UndoNotifier::new(),
            next_tracker: AtomicU64::new(1),
            max_trackers: None,
            reject_records: AtomicBool::new(false),
        }
    }

    /// Makes tracker allocation fail once `limit` trackers are alive.
    #[must_use]
    pub fn with_max_trackers(mut self, limit: usize) -> Self {
        self.max_trackers = Some(limit);
        self
    }

    /// While set, every `record_object` call fails with [`HostError::Rejected`].
    pub fn reject_records(&self, reject: bool) {
        self.reject_records.store(reject, Ordering::Relaxed);
    }

    /// Undoes the most recent record and notifies subscribers.
    ///
    /// Returns `false` without notifying when there is nothing to undo.
    pub fn perform_undo(&self) -> bool {
        self.jump_back(1) == 1
    }

    /// Redoes the most recently undone record and notifies subscribers.
    pub fn perform_redo(&self) -> bool {
        self.jump_forward(1) == 1
    }

    /// Undoes up to `steps` records, then fires a single notification.
    pub fn jump_back(&self, steps: usize) -> usize {
        let moved = {
            let mut state = self.state.lock();
            let mut moved = 0;
            while moved < steps {
                let Some(mut record) = state.undo.pop() else {
                    break;
                };
                record.after = record.tracker.snapshot();
                record.tracker.restore(record.before);
                state.redo.push(record);
                moved += 1;
            }
            moved
        };

        if moved > 0 {
            tracing::debug!(steps = moved, "host undo performed");
            self.notifier.notify();
        }
        moved
    }

    /// Redoes up to `steps` records, then fires a single notification.
    pub fn jump_forward(&self, steps: usize) -> usize {
        let moved = {
            let mut state = self.state.lock();
            let mut moved = 0;
            while moved < steps {
                let Some(record) = state.redo.pop() else {
                    break;
                };
                record.tracker.restore(record.after);
                state.undo.push(record);
                moved += 1;
            }
            moved
        };

        if moved > 0 {
            tracing::debug!(steps = moved, "host redo performed");
            self.notifier.notify();
        }
        moved
    }

    /// Labels of the host's undo records, most recent first.
    #[must_use]
    pub fn undo_labels(&self) -> Vec<String> {
        let state = self.state.lock();
        state.undo.iter().rev().map(|r| r.label.clone()).collect()
    }

    /// Labels of the host's redo records, most recently undone first.
    #[must_use]
    pub fn redo_labels(&self) -> Vec<String> {
        let state = self.state.lock();
        state.redo.iter().rev().map(|r| r.label.clone()).collect()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.notifier.len()
    }

    #[must_use]
    pub fn live_trackers(&self) -> usize {
        self.state.lock().live.len()
    }
}

impl Default for MemoryUndoHost {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHost for MemoryUndoHost {
    fn create_tracker(&self) -> Result<Tracker, HostError> {
        let mut state = self.state.lock();
        if self
            .max_trackers
            .is_some_and(|limit| state.live.len() >= limit)
        {
            return Err(HostError::AllocationFailed);
        }

        let id = TrackerId::new(self.next_tracker.fetch_add(1, Ordering::Relaxed));
        state.live.insert(id);
        Ok(Tracker::new(id))
    }

    fn record_object(&self, tracker: &Tracker, label: &str) -> Result<(), HostError> {
        if self.reject_records.load(Ordering::Relaxed) {
            return Err(HostError::Rejected(label.to_owned()));
        }

        let mut state = self.state.lock();
        if !state.live.contains(&tracker.id()) {
            return Err(HostError::UnknownObject(tracker.id()));
        }

        let before = tracker.snapshot();
        state.redo.clear();
        state.undo.push(Record {
            tracker: tracker.clone(),
            label: label.to_owned(),
            before,
            after: before,
        });
        Ok(())
    }

    fn subscribe(&self, callback: UndoCallback) -> Subscription {
        self.notifier.subscribe(callback)
    }

    fn clear_undo(&self, tracker: &Tracker) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if !state.live.contains(&tracker.id()) {
            return Err(HostError::UnknownObject(tracker.id()));
        }

        let id = tracker.id();
        state.undo.retain(|r| r.tracker.id() != id);
        state.redo.retain(|r| r.tracker.id() != id);
        Ok(())
    }

    fn destroy_tracker(&self, tracker: Tracker) {
        let mut state = self.state.lock();
        let id = tracker.id();
        state.undo.retain(|r| r.tracker.id() != id);
        state.redo.retain(|r| r.tracker.id() != id);
        state.live.remove(&id);
    }
}
