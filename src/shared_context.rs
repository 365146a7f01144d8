use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Shared handle to the state commands edit, e.g. the behaviour tree open in
/// the editor.
///
/// Clones point at the same value. The history's host bridge keeps a clone so
/// host-driven undo/redo can reach the state without the caller passing it in.
///
/// # Examples
///
/// ```
/// use bt_editor_history::shared_context::SharedContext;
///
/// let context = SharedContext::new(vec![1, 2]);
/// let editor_view = context.clone();
///
/// context.modify(|values| values.push(3));
/// assert_eq!(editor_view.read(Vec::len), 3);
/// ```
pub struct SharedContext<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> SharedContext<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Locks the value. Blocks while another handle holds the lock.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    #[allow(clippy::must_use_candidate)]
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// Runs `f` on a locked view of the value and returns its result.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Runs `f` on the locked value and returns its result.
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    /// Returns `true` if both handles point at the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for SharedContext<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedContext<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for SharedContext<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Some(value) => write!(f, "SharedContext({:?})", *value),
            None => write!(f, "SharedContext(<locked>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_value() {
        let context = SharedContext::new(20);
        let cloned_context = context.clone();
        {
            let mut value = cloned_context.lock();
            *value += 10;
        }
        assert_eq!(*context.lock(), 30);
        assert!(context.ptr_eq(&cloned_context));
    }

    #[test]
    fn test_default() {
        let context: SharedContext<Vec<u8>> = SharedContext::default();
        assert!(context.read(Vec::is_empty));
    }

    #[test]
    fn test_read_and_modify_return_values() {
        let context = SharedContext::new(String::from("seq"));
        let len = context.modify(|name| {
            name.push_str("uence");
            name.len()
        });
        assert_eq!(len, 8);
        assert_eq!(context.read(Clone::clone), "sequence");
    }

    #[test]
    fn test_try_lock() {
        let context = SharedContext::new(5);

        {
            let _guard = context.lock();
            assert!(
                context.try_lock().is_none(),
                "Expected try_lock to fail while the lock is held"
            );
        }

        let guard = context.try_lock();
        assert!(guard.is_some());
        assert_eq!(*guard.unwrap(), 5);
    }

    #[test]
    fn test_unrelated_handles_differ() {
        let a = SharedContext::new(1);
        let b = SharedContext::new(1);
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_debug() {
        let context = SharedContext::new(5);
        assert_eq!(format!("{:?}", context), "SharedContext(5)");
        let _guard = context.lock();
        assert_eq!(format!("{:?}", context), "SharedContext(<locked>)");
    }
}
