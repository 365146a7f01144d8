use std::borrow::Cow;

/// A reversible edit that can be executed, undone, redone and merged with a
/// follow-up edit of the same kind.
///
/// Each command captures exactly the state it needs to apply and reverse one
/// logical edit. `undo` after `execute` (or after `redo`) must restore the
/// context to what it was before `execute`, and `redo` after `undo` must bring
/// back the post-`execute` state.
///
/// # Associated Types
///
/// * `Context`: The type of the context in which the command operates.
///
/// # Required Methods
///
/// * `execute(&mut self, ctx: &Self::Context)`: Applies the edit.
/// * `undo(&mut self, ctx: &Self::Context)`: Reverses the edit.
///
/// # Provided Methods
///
/// * `redo(&mut self, ctx: &Self::Context)`: Re-applies the edit by calling `execute`.
/// * `combine_with(&mut self, other: &Self) -> bool`: Folds `other` into `self`. Never combines by default.
/// * `name(&self) -> Cow<str>`: Label shown in history lists. Defaults to "Unknown command".
///
/// # Example
///
/// ```
/// use bt_editor_history::prelude::{Command, SharedContext};
/// use std::borrow::Cow;
///
/// struct Nudge(i32);
///
/// impl Command for Nudge {
///     type Context = SharedContext<i32>;
///
///     fn execute(&mut self, ctx: &Self::Context) {
///         *ctx.lock() += self.0;
///     }
///
///     fn undo(&mut self, ctx: &Self::Context) {
///         *ctx.lock() -= self.0;
///     }
///
///     fn combine_with(&mut self, other: &Self) -> bool {
///         self.0 += other.0;
///         true
///     }
///
///     fn name(&self) -> Cow<'_, str> {
///         Cow::Borrowed("Nudge")
///     }
/// }
///
/// let ctx = SharedContext::new(0);
/// let mut nudge = Nudge(2);
/// nudge.execute(&ctx);
///
/// let mut more = Nudge(3);
/// more.execute(&ctx);
/// assert!(nudge.combine_with(&more));
///
/// nudge.undo(&ctx);
/// assert_eq!(*ctx.lock(), 0);
/// ```
pub trait Command {
    type Context;

    /// Applies the edit to `ctx`.
    fn execute(&mut self, ctx: &Self::Context);

    /// Reverses the edit on `ctx`.
    fn undo(&mut self, ctx: &Self::Context);

    /// Re-applies the edit after an undo. Calls `execute` unless overridden.
    fn redo(&mut self, ctx: &Self::Context) {
        self.execute(ctx);
    }

    /// Tries to fold `other`, which has already been executed, into `self`.
    ///
    /// On success undoing `self` must reverse both edits, and the caller drops
    /// `other` instead of recording it.
    fn combine_with(&mut self, other: &Self) -> bool {
        let _ = other;
        false
    }

    /// Returns the label used for history lists and host checkpoints.
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("Unknown command")
    }
}
