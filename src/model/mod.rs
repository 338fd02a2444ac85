//! Entities - the three record types held by the entity store.
//!
//! Each entity is a plain value: the store replaces it as a whole on every
//! `put`, so readers never observe a half-applied change. Rules that keep an
//! entity internally consistent (copy counts, open-loan counts, loan closure)
//! live on the entity itself; rules that span entities live in
//! [`crate::lending`].
//!
//! ## Example
//!
//! ```ignore
//! use lending_ledger::{Book, BookCategory, Model};
//!
//! let mut book = Book::new("978-0", "Dune", "Herbert", "Chilton", published, BookCategory::Fiction, 2);
//! assert_eq!(Book::COLLECTION, "books");
//! assert!(book.mark_borrowed());
//! assert_eq!(book.available_copies(), 1);
//! ```

mod book;
mod loan;
mod member;

use serde::{de::DeserializeOwned, Serialize};

pub use book::{Book, BookCategory, BookStatus};
pub use loan::LoanRecord;
pub use member::{Address, LoanRef, Member, MembershipTier, Person, TierPolicy};

/// Trait for entity types that can be held by a [`crate::store::Store`].
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection name for this entity type ("members", "books", "loans").
    /// Used as the key prefix handed to write hooks.
    const COLLECTION: &'static str;

    /// Returns the natural identifier of this entity.
    fn id(&self) -> &str;
}

impl Model for Member {
    const COLLECTION: &'static str = "members";

    fn id(&self) -> &str {
        self.id()
    }
}

impl Model for Book {
    const COLLECTION: &'static str = "books";

    fn id(&self) -> &str {
        self.isbn()
    }
}

impl Model for LoanRecord {
    const COLLECTION: &'static str = "loans";

    fn id(&self) -> &str {
        self.id()
    }
}
