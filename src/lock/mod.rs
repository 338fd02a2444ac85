//! Per-key mutual exclusion for the lending engine.
//!
//! The engine takes one lock per member and one per book (keys
//! `member:{id}` and `book:{isbn}`) so that the read-check-write sequence of
//! a borrow or return is never interleaved with another operation on the
//! same entity, while operations on unrelated entities run in parallel.

mod error;
mod guard;
mod in_memory;
mod lock;
mod lock_manager;

pub use error::LockError;
pub use guard::LockGuard;
pub use in_memory::{InMemoryLock, InMemoryLockManager};
pub use lock::Lock;
pub use lock_manager::LockManager;

/// Lock key guarding a member and its loan references.
pub fn member_key(member_id: &str) -> String {
    format!("member:{}", member_id)
}

/// Lock key guarding a book's copy counts.
pub fn book_key(isbn: &str) -> String {
    format!("book:{}", isbn)
}
