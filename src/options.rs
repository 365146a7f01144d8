/// How a host notification that crossed more than one of our checkpoints is
/// reconciled with the local stacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MultiStepPolicy {
    /// Replay as many local steps as the tracker moved.
    #[default]
    Replay,
    /// Replay a single step per notification, whatever the distance.
    SingleStep,
}

impl MultiStepPolicy {
    pub(crate) fn steps(self, distance: usize) -> usize {
        match self {
            Self::Replay => distance,
            Self::SingleStep => distance.min(1),
        }
    }
}

/// Settings for a [`CommandHistory`](crate::command_history::CommandHistory).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryOptions {
    pub multi_step: MultiStepPolicy,
}

impl HistoryOptions {
    #[must_use]
    pub fn with_multi_step(mut self, policy: MultiStepPolicy) -> Self {
        self.multi_step = policy;
        self
    }
}
