use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::TierPolicy;

/// One lending of one copy of a book to one member.
///
/// Created only by a successful borrow and closed only by a successful return.
/// Once `return_date` is set it never changes, and `late_fee` is fixed at
/// that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    id: String,
    member_id: String,
    book_isbn: String,
    borrow_date: NaiveDate,
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
    late_fee: u64,
}

impl LoanRecord {
    pub fn new(
        id: impl Into<String>,
        member_id: impl Into<String>,
        book_isbn: impl Into<String>,
        borrow_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        LoanRecord {
            id: id.into(),
            member_id: member_id.into(),
            book_isbn: book_isbn.into(),
            borrow_date,
            due_date,
            return_date: None,
            late_fee: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    pub fn book_isbn(&self) -> &str {
        &self.book_isbn
    }

    pub fn borrow_date(&self) -> NaiveDate {
        self.borrow_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    /// Fee in minor currency units, fixed at return time.
    pub fn late_fee(&self) -> u64 {
        self.late_fee
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    /// Open and past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && today > self.due_date
    }

    /// Days past due for an open loan; always 0 once returned.
    pub fn overdue_days(&self, today: NaiveDate) -> i64 {
        if !self.is_overdue(today) {
            return 0;
        }
        (today - self.due_date).num_days()
    }

    /// Days the copy has been (or was) out.
    pub fn borrowing_days(&self, today: NaiveDate) -> i64 {
        let end = self.return_date.unwrap_or(today);
        (end - self.borrow_date).num_days()
    }

    /// Close the loan on `returned_on`, charging `policy.late_fee_per_day` for
    /// every day past due. Returns `false` if the loan was already closed.
    pub fn close(&mut self, returned_on: NaiveDate, policy: &TierPolicy) -> bool {
        if self.is_returned() {
            return false;
        }

        self.return_date = Some(returned_on);
        if returned_on > self.due_date {
            self.late_fee = policy.late_fee((returned_on - self.due_date).num_days());
        }
        true
    }

    /// Push the due date forward. Only open loans with a positive extension
    /// are changed.
    pub fn extend_due_date(&mut self, additional_days: i64) -> bool {
        if self.is_returned() || additional_days <= 0 {
            return false;
        }

        let Ok(days) = u64::try_from(additional_days) else {
            return false;
        };
        match self.due_date.checked_add_days(Days::new(days)) {
            Some(due) => {
                self.due_date = due;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for LoanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} borrowed {} due {}",
            self.id, self.book_isbn, self.member_id, self.borrow_date, self.due_date
        )?;
        if let Some(returned) = self.return_date {
            write!(f, " returned {}", returned)?;
        }
        Ok(())
    }
}
