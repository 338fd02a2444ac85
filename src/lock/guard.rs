use std::sync::Arc;

use super::{Lock, LockError};

/// Holds a [`Lock`] until dropped.
pub struct LockGuard<L: Lock> {
    lock: Arc<L>,
}

impl<L: Lock> LockGuard<L> {
    pub fn acquire(lock: Arc<L>) -> Result<Self, LockError> {
        lock.lock()?;
        Ok(LockGuard { lock })
    }

    /// Returns `None` without blocking when the lock is already held.
    pub fn try_acquire(lock: Arc<L>) -> Result<Option<Self>, LockError> {
        if lock.try_lock()? {
            Ok(Some(LockGuard { lock }))
        } else {
            Ok(None)
        }
    }
}

impl<L: Lock> Drop for LockGuard<L> {
    fn drop(&mut self) {
        if let Err(err) = self.lock.unlock() {
            tracing::error!(error = %err, "failed to release lock");
        }
    }
}
