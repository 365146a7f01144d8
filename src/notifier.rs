use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

use parking_lot::Mutex;

/// Callback fired after the host performed an undo or redo.
pub type UndoCallback = Arc<dyn Fn() + Send + Sync>;

type Subscribers = Mutex<Vec<(u64, UndoCallback)>>;

/// Ordered list of parties interested in host undo/redo notifications.
///
/// Every subscriber is called on [`notify`](Self::notify), in the order they
/// subscribed, so independent consumers never need to save and restore each
/// other's handlers.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
/// use bt_editor_history::notifier::UndoNotifier;
///
/// let notifier = UndoNotifier::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&hits);
/// let subscription = notifier.subscribe(Arc::new(move || {
///     counter.fetch_add(1, Ordering::Relaxed);
/// }));
///
/// notifier.notify();
/// drop(subscription);
/// notifier.notify();
///
/// assert_eq!(hits.load(Ordering::Relaxed), 1);
/// ```
pub struct UndoNotifier {
    subscribers: Arc<Subscribers>,
    next_id: AtomicU64,
}

impl UndoNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Appends `callback` to the list. It stays subscribed until the returned
    /// handle is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: UndoCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, callback));

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Calls every subscriber in subscription order.
    ///
    /// The list is snapshotted first, callbacks may subscribe or unsubscribe.
    pub fn notify(&self) {
        let callbacks: Vec<UndoCallback> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }
}

impl Default for UndoNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UndoNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoNotifier")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle keeping one callback subscribed to an [`UndoNotifier`].
pub struct Subscription {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
