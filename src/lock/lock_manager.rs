use std::sync::Arc;

use super::{Lock, LockError, LockGuard};

/// Factory for per-key locks.
///
/// Repeated calls with the same key must hand out the same logical lock.
pub trait LockManager: Send + Sync {
    /// The concrete lock type returned by this manager.
    type Lock: Lock;

    /// Get (or create) the lock for `key`.
    fn get_lock(&self, key: &str) -> Result<Arc<Self::Lock>, LockError>;

    /// Block until the lock for `key` is held; released when the guard drops.
    fn acquire(&self, key: &str) -> Result<LockGuard<Self::Lock>, LockError> {
        let lock = self.get_lock(key)?;
        LockGuard::acquire(lock)
    }
}
