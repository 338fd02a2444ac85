use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use dashmap::DashMap;

use super::{Lock, LockError, LockManager};

/// Process-local lock for one entity key.
///
/// `held` is the only state; waiters park on `released` until the holder
/// clears it.
#[derive(Default)]
pub struct InMemoryLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl InMemoryLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn held(&self) -> Result<MutexGuard<'_, bool>, LockError> {
        self.held
            .lock()
            .map_err(|err| LockError::Poisoned(err.to_string()))
    }
}

impl Lock for InMemoryLock {
    fn lock(&self) -> Result<(), LockError> {
        let held = self.held()?;
        let mut held = self
            .released
            .wait_while(held, |held| *held)
            .map_err(|err| LockError::Poisoned(err.to_string()))?;
        *held = true;
        Ok(())
    }

    fn try_lock(&self) -> Result<bool, LockError> {
        let mut held = self.held()?;
        let acquired = !*held;
        *held = true;
        Ok(acquired)
    }

    fn unlock(&self) -> Result<(), LockError> {
        let mut held = self.held()?;
        if std::mem::replace(&mut *held, false) {
            self.released.notify_one();
        }
        Ok(())
    }
}

/// Hands out one [`InMemoryLock`] per entity key, created on first use.
///
/// The key table is a `DashMap`, so looking up the lock for one member does
/// not wait on lookups for unrelated books.
#[derive(Default)]
pub struct InMemoryLockManager {
    locks: DashMap<String, Arc<InMemoryLock>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys that have been locked at least once.
    pub fn key_count(&self) -> usize {
        self.locks.len()
    }
}

impl LockManager for InMemoryLockManager {
    type Lock = InMemoryLock;

    fn get_lock(&self, key: &str) -> Result<Arc<InMemoryLock>, LockError> {
        if let Some(lock) = self.locks.get(key) {
            return Ok(Arc::clone(lock.value()));
        }
        let lock = self.locks.entry(key.to_string()).or_default();
        Ok(Arc::clone(lock.value()))
    }
}
