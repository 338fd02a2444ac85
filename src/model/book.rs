use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Shelf classification of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookCategory {
    Fiction,
    NonFiction,
    Science,
    Technology,
    History,
    Biography,
    Reference,
    Children,
    Textbook,
    Magazine,
}

impl BookCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            BookCategory::Fiction => "Fiction",
            BookCategory::NonFiction => "Non-Fiction",
            BookCategory::Science => "Science",
            BookCategory::Technology => "Technology",
            BookCategory::History => "History",
            BookCategory::Biography => "Biography",
            BookCategory::Reference => "Reference",
            BookCategory::Children => "Children",
            BookCategory::Textbook => "Textbook",
            BookCategory::Magazine => "Magazine",
        }
    }
}

impl fmt::Display for BookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lending state of a title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    #[default]
    Available,
    Borrowed,
    Maintenance,
    Lost,
    Damaged,
}

impl BookStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Borrowed => "Borrowed",
            BookStatus::Maintenance => "Under Maintenance",
            BookStatus::Lost => "Lost",
            BookStatus::Damaged => "Damaged",
        }
    }

    /// Statuses that take every copy off the shelf.
    pub fn is_withdrawn(&self) -> bool {
        matches!(
            self,
            BookStatus::Maintenance | BookStatus::Lost | BookStatus::Damaged
        )
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A title held in one or more interchangeable copies.
///
/// `available_copies` is a cached value: it only moves through
/// [`Book::mark_borrowed`], [`Book::mark_returned`], [`Book::set_total_copies`]
/// and [`Book::set_status`], which keep it within `0..=total_copies` and in
/// step with `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    isbn: String,
    title: String,
    author: String,
    publisher: String,
    publication_date: NaiveDate,
    category: BookCategory,
    status: BookStatus,
    total_copies: u32,
    available_copies: u32,
}

impl Book {
    /// Create a fully available title. `total_copies` is clamped to at least 1.
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        publisher: impl Into<String>,
        publication_date: NaiveDate,
        category: BookCategory,
        total_copies: u32,
    ) -> Self {
        let total_copies = total_copies.max(1);
        Book {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            publisher: publisher.into(),
            publication_date,
            category,
            status: BookStatus::Available,
            total_copies,
            available_copies: total_copies,
        }
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn publication_date(&self) -> NaiveDate {
        self.publication_date
    }

    pub fn category(&self) -> BookCategory {
        self.category
    }

    pub fn status(&self) -> BookStatus {
        self.status
    }

    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_publisher(&mut self, publisher: impl Into<String>) {
        self.publisher = publisher.into();
    }

    pub fn set_category(&mut self, category: BookCategory) {
        self.category = category;
    }

    /// Whether a copy can be lent right now.
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available && self.available_copies > 0
    }

    /// Take one copy off the shelf.
    ///
    /// Returns `false` without touching the book when nothing is available.
    /// The last copy out flips the status to `Borrowed`.
    pub fn mark_borrowed(&mut self) -> bool {
        if !self.is_available() {
            return false;
        }

        self.available_copies -= 1;
        if self.available_copies == 0 {
            self.status = BookStatus::Borrowed;
        }
        true
    }

    /// Put one copy back on the shelf.
    ///
    /// Returns `false` when every copy is already available, so a repeated
    /// return can never inflate the count. The last copy in flips the status
    /// back to `Available`.
    pub fn mark_returned(&mut self) -> bool {
        if self.available_copies >= self.total_copies {
            return false;
        }

        self.available_copies += 1;
        if self.available_copies == self.total_copies {
            self.status = BookStatus::Available;
        }
        true
    }

    /// Change the number of copies held (clamped to at least 1) and re-derive
    /// the available count from the current status.
    pub fn set_total_copies(&mut self, total_copies: u32) {
        self.total_copies = total_copies.max(1);
        self.derive_available_copies();
    }

    /// Move the title to a new status and re-derive the available count.
    pub fn set_status(&mut self, status: BookStatus) {
        self.status = status;
        self.derive_available_copies();
    }

    fn derive_available_copies(&mut self) {
        self.available_copies = match self.status {
            BookStatus::Available => self.total_copies,
            BookStatus::Borrowed => self.total_copies.saturating_sub(1),
            BookStatus::Maintenance | BookStatus::Lost | BookStatus::Damaged => 0,
        };
    }

    /// Whole years since publication.
    pub fn age(&self, today: NaiveDate) -> i32 {
        today.year() - self.publication_date.year()
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} by {} [{}] {}/{} available",
            self.isbn,
            self.title,
            self.author,
            self.status,
            self.available_copies,
            self.total_copies
        )
    }
}
