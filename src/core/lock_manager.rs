use parking_lot::RwLock;

/// In-process reader-writer discipline (C4): multiple reads run
/// concurrently, a write excludes all other reads and writes. `parking_lot`
/// guards release their lock on every exit path, including unwinding, so a
/// panicking closure can never leave the store latched.
///
/// This is generic purely so it composes cleanly with whatever payload a
/// caller hangs off it; the store itself only ever instantiates
/// `LockManager<()>`, since the authoritative state is the backing file, not
/// an in-process cache -- see the module docs on [`crate::core::store`].
pub struct LockManager<T> {
    inner: RwLock<T>,
}

impl<T> LockManager<T> {
    pub fn new(value: T) -> Self {
        LockManager { inner: RwLock::new(value) }
    }

    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.inner.read();
        f(&guard)
    }

    pub fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.inner.write();
        f(&mut guard)
    }
}
