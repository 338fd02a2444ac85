use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lending_ledger::{
    Book, InMemoryStore, LendingConfig, LendingError, LibraryStore, LoanRecord, Member,
    MembershipTier, Store, StoreError, Versioned,
};

use crate::support::{date, library_with, Library};

/// Book store shared with a writer that does not go through the engine's
/// locks. While `interleave` is non-zero, that writer rewrites the book just
/// before each compare-and-set lands.
#[derive(Default)]
struct SharedBooks {
    inner: InMemoryStore<Book>,
    interleave: AtomicUsize,
}

impl SharedBooks {
    fn interleave(&self, writes: usize) {
        self.interleave.store(writes, Ordering::SeqCst);
    }
}

impl Store<Book> for SharedBooks {
    fn put(&self, model: &Book) -> u64 {
        self.inner.put(model)
    }

    fn put_if_version(&self, model: &Book, expected_version: u64) -> Result<u64, StoreError> {
        let pending = self
            .interleave
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if pending.is_ok() {
            if let Some(current) = self.inner.get(model.isbn()) {
                self.inner.put(&current);
            }
        }
        self.inner.put_if_version(model, expected_version)
    }

    fn get_versioned(&self, id: &str) -> Option<Versioned<Book>> {
        self.inner.get_versioned(id)
    }

    fn list(&self) -> Vec<Book> {
        self.inner.list()
    }

    fn find(&self, predicate: &dyn Fn(&Book) -> bool) -> Vec<Book> {
        self.inner.find(predicate)
    }

    fn delete(&self, id: &str) -> bool {
        self.inner.delete(id)
    }

    fn exists(&self, id: &str) -> bool {
        self.inner.exists(id)
    }

    fn count(&self) -> usize {
        self.inner.count()
    }
}

fn shared_library() -> (Library, Arc<SharedBooks>) {
    let books = Arc::new(SharedBooks::default());
    let store = LibraryStore::new(
        Arc::new(InMemoryStore::<Member>::new()),
        books.clone(),
        Arc::new(InMemoryStore::<LoanRecord>::new()),
    );
    (library_with(store, LendingConfig::default()), books)
}

#[test]
fn return_retries_when_the_book_changed_underneath() {
    let (lib, books) = shared_library();
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    let loan = lib
        .engine
        .borrow_book(member.id(), "A", date(2024, 1, 15))
        .unwrap();

    books.interleave(2);
    assert!(lib.engine.return_book(member.id(), "A").unwrap());

    let book = lib.engine.find_book("A").unwrap();
    assert_eq!(book.available_copies(), 1);
    assert!(book.is_available());
    assert!(lib.engine.loan(loan.id()).unwrap().is_returned());
    assert_eq!(
        lib.engine.find_member(member.id()).unwrap().current_borrowed_count(),
        0
    );

    // Nothing left dangling: the copy can go straight back out.
    lib.engine
        .borrow_book(member.id(), "A", date(2024, 1, 20))
        .unwrap();
}

#[test]
fn member_reference_closes_even_if_the_book_write_keeps_failing() {
    let (lib, books) = shared_library();
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    let loan = lib
        .engine
        .borrow_book(member.id(), "A", date(2024, 1, 15))
        .unwrap();

    books.interleave(usize::MAX);
    let err = lib.engine.return_book(member.id(), "A").unwrap_err();
    assert!(matches!(
        err,
        LendingError::Store(StoreError::VersionConflict { .. })
    ));

    assert!(lib.engine.loan(loan.id()).unwrap().is_returned());
    let member = lib.engine.find_member(member.id()).unwrap();
    assert_eq!(member.current_borrowed_count(), 0);
    assert!(lib.engine.active_loans().is_empty());
}
