use std::fmt;

use crate::model::{Book, LoanRecord, Member};

/// An open, past-due loan joined with the book and member it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueLoan {
    pub book: Book,
    pub member: Member,
    pub loan: LoanRecord,
    pub days_overdue: i64,
}

impl OverdueLoan {
    /// Reminder text sent to the member.
    pub fn reminder(&self) -> String {
        format!(
            "\"{}\" was due on {} and is {} day(s) overdue. Please return it.",
            self.book.title(),
            self.loan.due_date(),
            self.days_overdue
        )
    }
}

impl fmt::Display for OverdueLoan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Book: {} by {} (ISBN: {})",
            self.book.title(),
            self.book.author(),
            self.book.isbn()
        )?;
        writeln!(
            f,
            "Borrowed by: {} (ID: {})",
            self.member.full_name(),
            self.member.id()
        )?;
        writeln!(f, "Due Date: {}", self.loan.due_date())?;
        write!(f, "Days Overdue: {}", self.days_overdue)
    }
}
