use thiserror::Error;

use crate::tracker::TrackerId;

/// Result type for history operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by [`CommandHistory`](crate::command_history::CommandHistory).
#[derive(Debug, Error)]
pub enum Error {
    /// The call breaks the history's usage contract, e.g. executing a command
    /// from inside an undo/redo replay or unhooking a history that is not hooked.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    /// The host could not allocate the tracker the bridge depends on.
    #[error("undo tracker could not be created")]
    TrackerUnavailable(#[source] HostError),

    /// A host call failed and was propagated as is.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Errors reported by an [`UndoHost`](crate::traits::undo_host::UndoHost).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("tracker {0} is not known to the host")]
    UnknownObject(TrackerId),

    #[error("host rejected the record request: {0}")]
    Rejected(String),

    #[error("host failed to allocate a tracked object")]
    AllocationFailed,
}
