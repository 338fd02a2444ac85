//! Read-only summary counts over the entity store.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::store::LibraryStore;

/// A point-in-time summary of the library.
///
/// Each collection is read from its own snapshot, so counts from different
/// collections may straddle a concurrent borrow or return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LibraryStatistics {
    pub total_members: usize,
    pub active_members: usize,
    pub total_books: usize,
    pub available_books: usize,
    pub borrowed_books: usize,
    pub total_loan_records: usize,
    pub open_loans: usize,
    pub overdue_loans: usize,
    pub generated_on: NaiveDate,
}

impl LibraryStatistics {
    /// Count everything in `store`, judging overdue loans as of `today`.
    pub fn collect(store: &LibraryStore, today: NaiveDate) -> Self {
        let members = store.members().list();
        let books = store.books().list();
        let loans = store.loans().list();

        let total_books = books.len();
        let available_books = books.iter().filter(|book| book.is_available()).count();

        let stats = LibraryStatistics {
            total_members: members.len(),
            active_members: members.iter().filter(|m| m.is_active()).count(),
            total_books,
            available_books,
            borrowed_books: total_books - available_books,
            total_loan_records: loans.len(),
            open_loans: loans.iter().filter(|loan| loan.is_open()).count(),
            overdue_loans: loans.iter().filter(|loan| loan.is_overdue(today)).count(),
            generated_on: today,
        };
        debug!(?stats, "statistics collected");
        stats
    }

    /// Share of titles with no copy on the shelf, in `0.0..=1.0`.
    pub fn utilization(&self) -> f64 {
        ratio(self.borrowed_books, self.total_books)
    }

    pub fn member_activity_rate(&self) -> f64 {
        ratio(self.active_members, self.total_members)
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}

impl fmt::Display for LibraryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Library statistics as of {}", self.generated_on)?;
        writeln!(
            f,
            "  Members: {} ({} active, {:.1}%)",
            self.total_members,
            self.active_members,
            self.member_activity_rate() * 100.0
        )?;
        writeln!(
            f,
            "  Books: {} ({} available, {} borrowed, {:.1}% utilization)",
            self.total_books,
            self.available_books,
            self.borrowed_books,
            self.utilization() * 100.0
        )?;
        write!(
            f,
            "  Loans: {} total, {} open, {} overdue",
            self.total_loan_records, self.open_loans, self.overdue_loans
        )
    }
}
