use std::{
    cmp::Ordering as CmpOrdering,
    collections::VecDeque,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::{Mutex, RwLock};

use crate::{
    error::{Error, Result},
    notifier::Subscription,
    options::HistoryOptions,
    tracker::Tracker,
    traits::{command::Command, undo_host::UndoHost},
};

/// Undo/redo history of [`Command`]s, optionally kept in step with a host
/// editor's own undo system.
///
/// Both stacks keep their top at the front. Executing a command clears the
/// redo stack; undo and redo move commands between the two stacks.
///
/// Once [hooked](Self::hook), every recorded command also registers a
/// checkpoint with the host, planting the undo depth in a [`Tracker`]. When the
/// host later reports that it undid or redid something, the tracker's index is
/// compared with the local undo depth to work out which way the host moved.
pub struct CommandHistory<C: Command> {
    undo: RwLock<VecDeque<C>>,
    redo: RwLock<VecDeque<C>>,
    in_undo_redo: AtomicBool,
    options: HistoryOptions,
    bridge: Mutex<Option<HostBridge>>,
}

struct HostBridge {
    host: Arc<dyn UndoHost>,
    tracker: Tracker,
    subscription: Subscription,
}

impl HostBridge {
    fn release(self) {
        drop(self.subscription);
        if let Err(err) = self.host.clear_undo(&self.tracker) {
            tracing::warn!(tracker = %self.tracker.id(), error = %err, "failed to clear host undo records");
        }
        self.host.destroy_tracker(self.tracker);
    }
}

/// Raises the replay flag and puts back its previous value on drop.
struct ReplayGuard<'a> {
    flag: &'a AtomicBool,
    previous: bool,
}

impl<'a> ReplayGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        let previous = flag.swap(true, Ordering::AcqRel);
        Self { flag, previous }
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::Release);
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Undo,
    Redo,
}

impl<C: Command> CommandHistory<C> {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_options(HistoryOptions::default())
    }

    #[must_use]
    pub fn with_options(options: HistoryOptions) -> Arc<Self> {
        Arc::new(Self {
            undo: RwLock::new(VecDeque::new()),
            redo: RwLock::new(VecDeque::new()),
            in_undo_redo: AtomicBool::new(false),
            options,
            bridge: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn options(&self) -> HistoryOptions {
        self.options
    }

    /// Names of the undoable commands, most recent first.
    #[must_use]
    pub fn undo_commands(&self) -> Vec<String> {
        self.undo.read().iter().map(|c| c.name().into_owned()).collect()
    }

    /// Names of the redoable commands, most recently undone first.
    #[must_use]
    pub fn redo_commands(&self) -> Vec<String> {
        self.redo.read().iter().map(|c| c.name().into_owned()).collect()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.read().len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.read().len()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.read().is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.read().is_empty()
    }

    /// Executes `command` and records it.
    ///
    /// The redo stack is cleared first. With `combine` set, the command is
    /// offered to the top of the undo stack and dropped if that command
    /// absorbs it; otherwise it is pushed. While hooked, a pushed command
    /// also registers a host checkpoint labelled with its name.
    ///
    /// # Errors
    ///
    /// * [`Error::IllegalState`] when called from a command's `undo` or
    ///   `redo`. Nothing is executed and both stacks are left untouched.
    /// * [`Error::Host`] when the host refuses the checkpoint. The command
    ///   has run but is not recorded.
    pub fn execute(&self, mut command: C, ctx: &C::Context, combine: bool) -> Result<()> {
        if self.in_undo_redo.load(Ordering::Acquire) {
            return Err(Error::IllegalState(
                "commands cannot be executed while an undo or redo is replayed",
            ));
        }

        self.redo.write().clear();
        command.execute(ctx);

        if combine {
            let mut undo = self.undo.write();
            if let Some(top) = undo.front_mut() {
                if top.combine_with(&command) {
                    tracing::trace!(command = %top.name(), "combined into top of undo stack");
                    return Ok(());
                }
            }
        }

        // The host may notify from inside `record_object`, no stack lock is held here.
        let bridge = self.bridge_handles();
        if let Some((host, tracker)) = &bridge {
            tracker.set_index(self.undo_len());
            host.record_object(tracker, &command.name())?;
        }

        let mut undo = self.undo.write();
        tracing::debug!(command = %command.name(), depth = undo.len() + 1, "executed");
        undo.push_front(command);

        if let Some((_, tracker)) = &bridge {
            tracker.set_index(undo.len());
        }
        Ok(())
    }

    /// Executes each command in order without combining.
    ///
    /// # Errors
    ///
    /// Stops at the first command that fails to execute, see [`execute`](Self::execute).
    pub fn batch_execute(&self, commands: Vec<C>, ctx: &C::Context) -> Result<()> {
        for command in commands {
            self.execute(command, ctx, false)?;
        }
        Ok(())
    }

    /// Undoes the most recent command. Returns `false` if there was none.
    pub fn undo(&self, ctx: &C::Context) -> bool {
        self.undo_steps(ctx, 1) == 1
    }

    /// Redoes the most recently undone command. Returns `false` if there was none.
    pub fn redo(&self, ctx: &C::Context) -> bool {
        self.redo_steps(ctx, 1) == 1
    }

    /// Undoes up to `count` commands and returns how many were undone.
    pub fn undo_steps(&self, ctx: &C::Context, count: usize) -> usize {
        self.replay(ctx, count, Direction::Undo)
    }

    /// Redoes up to `count` commands and returns how many were redone.
    pub fn redo_steps(&self, ctx: &C::Context, count: usize) -> usize {
        self.replay(ctx, count, Direction::Redo)
    }

    fn replay(&self, ctx: &C::Context, count: usize, direction: Direction) -> usize {
        let (source, destination) = match direction {
            Direction::Undo => (&self.undo, &self.redo),
            Direction::Redo => (&self.redo, &self.undo),
        };

        let mut steps = 0;
        {
            let _replaying = ReplayGuard::enter(&self.in_undo_redo);
            while steps < count {
                let next = source.write().pop_front();
                let Some(mut command) = next else {
                    break;
                };

                match direction {
                    Direction::Undo => command.undo(ctx),
                    Direction::Redo => command.redo(ctx),
                }
                tracing::debug!(command = %command.name(), ?direction, "replayed");

                destination.write().push_front(command);
                steps += 1;
            }
        }

        if steps > 0 {
            self.sync_tracker();
        }
        steps
    }

    /// Drops every recorded command. While hooked, the host's records for
    /// this history are purged too.
    pub fn clear(&self) {
        self.undo.write().clear();
        self.redo.write().clear();

        if let Some((host, tracker)) = self.bridge_handles() {
            if let Err(err) = host.clear_undo(&tracker) {
                tracing::warn!(tracker = %tracker.id(), error = %err, "failed to clear host undo records");
            }
            tracker.set_index(0);
        }
    }

    #[must_use]
    pub fn is_hooked(&self) -> bool {
        self.bridge.lock().is_some()
    }

    /// Current tracker index, `None` while unhooked.
    #[must_use]
    pub fn tracker_index(&self) -> Option<usize> {
        self.bridge.lock().as_ref().map(|b| b.tracker.index())
    }

    /// Detaches from the host: unsubscribes, purges the host's records for
    /// the tracker (best effort) and releases the tracker.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalState`] if the history is not hooked.
    pub fn unhook(&self) -> Result<()> {
        let bridge = self
            .bridge
            .lock()
            .take()
            .ok_or(Error::IllegalState("history is not hooked"))?;

        tracing::debug!(tracker = %bridge.tracker.id(), "unhooked from host undo");
        bridge.release();
        Ok(())
    }

    /// Reconciles the local stacks after the host reported an undo or redo.
    ///
    /// The host may have acted on an object that is not ours, in which case
    /// the tracker still matches the undo depth and nothing happens.
    pub fn handle_host_undo_redo(&self, ctx: &C::Context) {
        if self.in_undo_redo.load(Ordering::Acquire) {
            tracing::trace!("host notification during replay ignored");
            return;
        }
        let Some(index) = self.tracker_index() else {
            return;
        };

        let depth = self.undo_len();
        match index.cmp(&depth) {
            CmpOrdering::Less => {
                let steps = self.options.multi_step.steps(depth - index);
                self.undo_steps(ctx, steps);
            }
            CmpOrdering::Greater => {
                let steps = self.options.multi_step.steps(index - depth);
                self.redo_steps(ctx, steps);
            }
            CmpOrdering::Equal => {
                tracing::trace!(index, "host undo/redo did not touch this history");
            }
        }
    }

    fn bridge_handles(&self) -> Option<(Arc<dyn UndoHost>, Tracker)> {
        self.bridge
            .lock()
            .as_ref()
            .map(|b| (Arc::clone(&b.host), b.tracker.clone()))
    }

    fn sync_tracker(&self) {
        if let Some((_, tracker)) = self.bridge_handles() {
            tracker.set_index(self.undo_len());
        }
    }
}

impl<C> CommandHistory<C>
where
    C: Command + Send + Sync + 'static,
    C::Context: Clone + Send + Sync + 'static,
{
    /// Starts mirroring this history into `host`.
    ///
    /// A tracker is allocated and seeded with the current undo depth, and a
    /// host subscription is taken that replays host undo/redo on `ctx`.
    ///
    /// # Errors
    ///
    /// * [`Error::IllegalState`] if already hooked.
    /// * [`Error::TrackerUnavailable`] if the host cannot allocate the tracker.
    pub fn hook(self: &Arc<Self>, host: Arc<dyn UndoHost>, ctx: C::Context) -> Result<()> {
        let mut bridge = self.bridge.lock();
        if bridge.is_some() {
            return Err(Error::IllegalState("history is already hooked"));
        }

        let tracker = host.create_tracker().map_err(Error::TrackerUnavailable)?;
        tracker.set_index(self.undo_len());

        let history = Arc::downgrade(self);
        let subscription = host.subscribe(Arc::new(move || {
            if let Some(history) = history.upgrade() {
                history.handle_host_undo_redo(&ctx);
            }
        }));

        tracing::debug!(tracker = %tracker.id(), depth = tracker.index(), "hooked into host undo");
        *bridge = Some(HostBridge {
            host,
            tracker,
            subscription,
        });
        Ok(())
    }
}

impl<C: Command> Drop for CommandHistory<C> {
    fn drop(&mut self) {
        if let Some(bridge) = self.bridge.get_mut().take() {
            bridge.release();
        }
    }
}

impl<C: Command> fmt::Debug for CommandHistory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo", &self.undo_commands())
            .field("redo", &self.redo_commands())
            .field("tracker_index", &self.tracker_index())
            .finish_non_exhaustive()
    }
}
