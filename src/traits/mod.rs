pub mod command;
pub mod undo_host;
