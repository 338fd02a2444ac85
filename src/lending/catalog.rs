use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::validation::{not_in_future, positive_copies, require, require_email, validate_person};
use super::LendingEngine;
use crate::error::{LendingError, LendingResult};
use crate::events::{EventKind, LendingEvent};
use crate::ids::IdKind;
use crate::lock::{book_key, member_key, LockManager};
use crate::model::{Book, BookCategory, BookStatus, LoanRecord, Member, MembershipTier, Person};
use crate::store::Versioned;

/// Input for [`LendingEngine::register_member`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub person: Person,
    pub tier: MembershipTier,
}

/// Partial update of a member. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub tier: Option<MembershipTier>,
}

/// Input for [`LendingEngine::add_book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publication_date: NaiveDate,
    pub category: BookCategory,
    pub total_copies: i64,
}

/// Partial update of a book. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub category: Option<BookCategory>,
    pub total_copies: Option<i64>,
}

/// Catalog filter. Text fields match case-insensitively on substrings; all
/// set criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<BookCategory>,
    pub available_only: bool,
}

impl BookQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn category(mut self, category: BookCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn available_only(mut self) -> Self {
        self.available_only = true;
        self
    }

    pub fn matches(&self, book: &Book) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .map_or(true, |needle| haystack.to_lowercase().contains(&needle.to_lowercase()))
        }

        contains(book.title(), &self.title)
            && contains(book.author(), &self.author)
            && self.category.map_or(true, |category| book.category() == category)
            && (!self.available_only || book.is_available())
    }
}

impl<LM: LockManager> LendingEngine<LM> {
    /// Validate and store a new, active member under a generated id.
    pub fn register_member(&self, new_member: NewMember) -> LendingResult<Member> {
        let today = self.clock.today();
        validate_person(&new_member.person, today)?;

        let member = Member::new(
            self.ids.next_id(IdKind::Member),
            new_member.person,
            new_member.tier,
            today,
        );
        self.store.members().put_if_version(&member, 0)?;

        info!(member_id = %member.id(), tier = %member.tier(), "member registered");
        self.publish(
            LendingEvent::new(
                self.ids.next_id(IdKind::Event),
                EventKind::MemberRegistered,
                format!("{} joined as {}", member.full_name(), member.tier()),
                self.clock.now(),
            )
            .with_member(member.id()),
        );
        Ok(member)
    }

    pub fn update_member(&self, member_id: &str, update: MemberUpdate) -> LendingResult<Member> {
        if let Some(first_name) = &update.first_name {
            require("first name", first_name)?;
        }
        if let Some(last_name) = &update.last_name {
            require("last name", last_name)?;
        }
        if let Some(email) = &update.email {
            require_email(email)?;
        }

        let guard = self.locks.acquire(&member_key(member_id))?;
        let mut member = self.load_member(member_id)?;

        let person = member.person_mut();
        if let Some(first_name) = update.first_name {
            person.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            person.last_name = last_name;
        }
        if let Some(email) = update.email {
            person.email = email;
        }
        if let Some(tier) = update.tier {
            member.set_tier(tier);
        }
        self.store.members().put(&member);
        drop(guard);

        info!(member_id, "member updated");
        self.publish(
            LendingEvent::new(
                self.ids.next_id(IdKind::Event),
                EventKind::MemberUpdated,
                format!("{} updated", member.full_name()),
                self.clock.now(),
            )
            .with_member(member_id),
        );
        Ok(member)
    }

    /// Soft delete. Open loans stay open and can still be returned.
    /// Returns `Ok(false)` if the member was already inactive.
    pub fn deactivate_member(&self, member_id: &str) -> LendingResult<bool> {
        let guard = self.locks.acquire(&member_key(member_id))?;
        let mut member = self.load_member(member_id)?;
        if !member.is_active() {
            return Ok(false);
        }

        member.set_active(false);
        self.store.members().put(&member);
        drop(guard);

        info!(member_id, open_loans = member.current_borrowed_count(), "member deactivated");
        self.publish(
            LendingEvent::new(
                self.ids.next_id(IdKind::Event),
                EventKind::MemberDeactivated,
                format!("{} deactivated", member.full_name()),
                self.clock.now(),
            )
            .with_member(member_id),
        );
        Ok(true)
    }

    /// Validate and catalog a new title. The ISBN must not be in use.
    pub fn add_book(&self, new_book: NewBook) -> LendingResult<Book> {
        require("isbn", &new_book.isbn)?;
        require("title", &new_book.title)?;
        require("author", &new_book.author)?;
        require("publisher", &new_book.publisher)?;
        not_in_future("publication date", new_book.publication_date, self.clock.today())?;
        let total_copies = positive_copies(new_book.total_copies)?;

        let guard = self.locks.acquire(&book_key(&new_book.isbn))?;
        if self.store.books().exists(&new_book.isbn) {
            warn!(isbn = %new_book.isbn, "book refused: duplicate isbn");
            return Err(LendingError::DuplicateBook {
                isbn: new_book.isbn,
            });
        }

        let book = Book::new(
            new_book.isbn,
            new_book.title,
            new_book.author,
            new_book.publisher,
            new_book.publication_date,
            new_book.category,
            total_copies,
        );
        self.store.books().put_if_version(&book, 0)?;
        drop(guard);

        info!(isbn = %book.isbn(), copies = total_copies, "book added");
        self.publish(
            LendingEvent::new(
                self.ids.next_id(IdKind::Event),
                EventKind::BookAdded,
                format!("\"{}\" by {} added", book.title(), book.author()),
                self.clock.now(),
            )
            .with_book(book.isbn()),
        );
        Ok(book)
    }

    /// Edit bibliographic fields or the number of copies held. A new copy
    /// count re-derives availability from the current status.
    pub fn update_book(&self, isbn: &str, update: BookUpdate) -> LendingResult<Book> {
        if let Some(title) = &update.title {
            require("title", title)?;
        }
        if let Some(author) = &update.author {
            require("author", author)?;
        }
        if let Some(publisher) = &update.publisher {
            require("publisher", publisher)?;
        }
        let total_copies = update.total_copies.map(positive_copies).transpose()?;

        let _guard = self.locks.acquire(&book_key(isbn))?;
        let Versioned {
            data: mut book,
            version,
        } = self.load_book(isbn)?;

        if let Some(title) = update.title {
            book.set_title(title);
        }
        if let Some(author) = update.author {
            book.set_author(author);
        }
        if let Some(publisher) = update.publisher {
            book.set_publisher(publisher);
        }
        if let Some(category) = update.category {
            book.set_category(category);
        }
        if let Some(total_copies) = total_copies {
            book.set_total_copies(total_copies);
        }
        self.store.books().put_if_version(&book, version)?;

        info!(isbn, available = book.available_copies(), total = book.total_copies(), "book updated");
        Ok(book)
    }

    /// Move a title to a new status (for example into maintenance).
    pub fn set_book_status(&self, isbn: &str, status: BookStatus) -> LendingResult<Book> {
        let _guard = self.locks.acquire(&book_key(isbn))?;
        let Versioned {
            data: mut book,
            version,
        } = self.load_book(isbn)?;

        book.set_status(status);
        self.store.books().put_if_version(&book, version)?;

        info!(isbn, status = %status, "book status changed");
        Ok(book)
    }

    /// Delete a title. Refused while any loan of it is open; `Ok(false)` if
    /// the ISBN is unknown.
    pub fn remove_book(&self, isbn: &str) -> LendingResult<bool> {
        let guard = self.locks.acquire(&book_key(isbn))?;

        let open_loans = self
            .store
            .loans()
            .find(&|loan: &LoanRecord| loan.is_open() && loan.book_isbn() == isbn)
            .len();
        if open_loans > 0 {
            warn!(isbn, open_loans, "removal refused: book is out on loan");
            return Err(LendingError::BookCurrentlyBorrowed {
                isbn: isbn.to_string(),
                open_loans,
            });
        }

        if !self.store.books().delete(isbn) {
            return Ok(false);
        }
        drop(guard);

        info!(isbn, "book removed");
        self.publish(
            LendingEvent::new(
                self.ids.next_id(IdKind::Event),
                EventKind::BookRemoved,
                format!("book {} removed from catalog", isbn),
                self.clock.now(),
            )
            .with_book(isbn),
        );
        Ok(true)
    }

    pub fn search_books(&self, query: &BookQuery) -> Vec<Book> {
        debug!(?query, "searching catalog");
        let mut books = self.store.books().find(&|book: &Book| query.matches(book));
        books.sort_by(|a, b| a.title().cmp(b.title()).then_with(|| a.isbn().cmp(b.isbn())));
        books
    }

    pub fn find_member(&self, member_id: &str) -> Option<Member> {
        self.store.members().get(member_id)
    }

    pub fn find_book(&self, isbn: &str) -> Option<Book> {
        self.store.books().get(isbn)
    }

    pub fn members(&self) -> Vec<Member> {
        self.store.members().list()
    }

    pub fn books(&self) -> Vec<Book> {
        self.store.books().list()
    }

    fn load_member(&self, member_id: &str) -> LendingResult<Member> {
        self.store
            .members()
            .get(member_id)
            .ok_or_else(|| LendingError::MemberNotFound {
                member_id: member_id.to_string(),
            })
    }

    fn load_book(&self, isbn: &str) -> LendingResult<Versioned<Book>> {
        self.store
            .books()
            .get_versioned(isbn)
            .ok_or_else(|| LendingError::BookNotFound {
                isbn: isbn.to_string(),
            })
    }
}
