use std::sync::Arc;

use super::{InMemoryStore, Store, WriteHook};
use crate::model::{Book, LoanRecord, Member};

/// The three entity stores the lending engine works against.
///
/// Cheap to clone; clones share the same underlying stores.
#[derive(Clone)]
pub struct LibraryStore {
    members: Arc<dyn Store<Member>>,
    books: Arc<dyn Store<Book>>,
    loans: Arc<dyn Store<LoanRecord>>,
}

impl LibraryStore {
    pub fn new(
        members: Arc<dyn Store<Member>>,
        books: Arc<dyn Store<Book>>,
        loans: Arc<dyn Store<LoanRecord>>,
    ) -> Self {
        LibraryStore {
            members,
            books,
            loans,
        }
    }

    /// Three empty in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::<Member>::new()),
            Arc::new(InMemoryStore::<Book>::new()),
            Arc::new(InMemoryStore::<LoanRecord>::new()),
        )
    }

    /// Three in-memory stores sharing one persistence hook.
    pub fn in_memory_with_hook(hook: Arc<dyn WriteHook>) -> Self {
        Self::new(
            Arc::new(InMemoryStore::<Member>::with_hook(Arc::clone(&hook))),
            Arc::new(InMemoryStore::<Book>::with_hook(Arc::clone(&hook))),
            Arc::new(InMemoryStore::<LoanRecord>::with_hook(hook)),
        )
    }

    pub fn members(&self) -> &dyn Store<Member> {
        self.members.as_ref()
    }

    pub fn books(&self) -> &dyn Store<Book> {
        self.books.as_ref()
    }

    pub fn loans(&self) -> &dyn Store<LoanRecord> {
        self.loans.as_ref()
    }
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
