//! Entity store - thread-safe keyed storage for members, books and loans.
//!
//! The store holds whole values and has no business rules. Every entry carries
//! a version that grows by one on each write, which gives callers a
//! compare-and-set primitive ([`Store::put_if_version`]) on top of plain
//! insert-or-replace.
//!
//! ## Example
//!
//! ```ignore
//! use lending_ledger::{InMemoryStore, Store};
//!
//! let books = InMemoryStore::<Book>::new();
//! let version = books.put(&book);
//! let current = books.get_versioned(book.isbn()).unwrap();
//! books.put_if_version(&updated, current.version)?;
//! ```

mod hook;
mod in_memory;
mod library;

use thiserror::Error;

use crate::model::Model;

pub use hook::{HookError, MemoryWriteHook, StoreWrite, WriteHook};
pub use in_memory::InMemoryStore;
pub use library::LibraryStore;

/// A value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict. `actual` is 0 when the entry is gone.
    #[error("version conflict on {collection}:{id} (expected {expected}, actual {actual})")]
    VersionConflict {
        collection: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },
}

/// Keyed storage for one entity type.
///
/// Writes replace the whole value atomically: readers see either the old or
/// the new entity, never a mix. Reads of a missing key are empty results,
/// not errors.
pub trait Store<M: Model>: Send + Sync {
    /// Insert or replace. Returns the version now stored.
    fn put(&self, model: &M) -> u64;

    /// Replace only if the stored version still equals `expected_version`
    /// (0 means "must not exist yet").
    fn put_if_version(&self, model: &M, expected_version: u64) -> Result<u64, StoreError>;

    fn get_versioned(&self, id: &str) -> Option<Versioned<M>>;

    fn get(&self, id: &str) -> Option<M> {
        self.get_versioned(id).map(|versioned| versioned.data)
    }

    /// Snapshot of every entity; later writes are not reflected.
    fn list(&self) -> Vec<M>;

    /// Snapshot of the entities matching `predicate`.
    fn find(&self, predicate: &dyn Fn(&M) -> bool) -> Vec<M>;

    /// Remove an entity. Returns whether anything was removed.
    fn delete(&self, id: &str) -> bool;

    fn exists(&self, id: &str) -> bool;

    fn count(&self) -> usize;
}
