#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::correctness)]
#![warn(clippy::complexity)]
#![warn(clippy::suspicious)]
#![warn(clippy::cargo)]

pub mod command_history;
pub mod error;
pub mod host;
pub mod notifier;
pub mod options;
pub mod shared_context;
pub mod tracker;
pub mod traits;
pub mod tree;

pub mod prelude {
	pub use crate::command_history::CommandHistory;
	pub use crate::error::{Error, HostError, Result};
	pub use crate::host::memory::MemoryUndoHost;
	pub use crate::notifier::{Subscription, UndoCallback, UndoNotifier};
	pub use crate::options::{HistoryOptions, MultiStepPolicy};
	pub use crate::shared_context::SharedContext;
	pub use crate::tracker::{Tracker, TrackerId, TrackerSnapshot};
	pub use crate::traits::command::Command;
	pub use crate::traits::undo_host::UndoHost;
	pub use crate::tree::commands::TreeCommand;
	pub use crate::tree::{BehaviourTree, Node, NodeId, NodeKind, Position};
}
