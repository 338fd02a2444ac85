use super::LockError;

/// Mutual exclusion for one entity key.
///
/// The engine holds a member lock, then a book lock, for the whole
/// read-check-write of a borrow or return. Anything that can block a caller
/// until the key is free will do; [`super::InMemoryLock`] is the
/// single-process implementation.
pub trait Lock: Send + Sync {
    /// Block until the key is ours.
    fn lock(&self) -> Result<(), LockError>;

    /// `Ok(false)` instead of blocking when someone else holds the key.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Give the key up. Releasing a free key is a no-op.
    fn unlock(&self) -> Result<(), LockError>;
}
