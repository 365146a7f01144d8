//! [`UndoHost`](crate::traits::undo_host::UndoHost) implementations.

pub mod memory;
