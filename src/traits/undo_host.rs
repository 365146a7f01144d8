use crate::{
    error::HostError,
    notifier::{Subscription, UndoCallback},
    tracker::Tracker,
};

/// The host editor's own undo system, seen from a [`CommandHistory`].
///
/// The host gives no structured information about what it undid. It only
/// snapshots tracked objects when asked to and fires a notification after
/// every undo or redo it performs, on any object.
///
/// [`CommandHistory`]: crate::command_history::CommandHistory
pub trait UndoHost: Send + Sync {
    /// Allocates the tracked object a history will record its depth into.
    ///
    /// # Errors
    ///
    /// Fails when the host cannot allocate the object.
    fn create_tracker(&self) -> Result<Tracker, HostError>;

    /// Registers a checkpoint labelled `label`, capturing the tracker's
    /// current index as the state to return to when the host undoes it.
    ///
    /// Must be called before the index is changed for that checkpoint.
    ///
    /// # Errors
    ///
    /// Fails when the tracker is unknown or the host refuses the record.
    fn record_object(&self, tracker: &Tracker, label: &str) -> Result<(), HostError>;

    /// Adds `callback` to the parties told about host undo/redo.
    fn subscribe(&self, callback: UndoCallback) -> Subscription;

    /// Purges host history referencing `tracker`. Best effort.
    ///
    /// # Errors
    ///
    /// Fails when the host could not purge its records.
    fn clear_undo(&self, tracker: &Tracker) -> Result<(), HostError>;

    /// Releases the tracked object.
    fn destroy_tracker(&self, tracker: Tracker) {
        drop(tracker);
    }
}
