use chrono::NaiveDate;
use thiserror::Error;

use crate::lock::LockError;
use crate::model::BookStatus;
use crate::store::StoreError;

/// Malformed input to a create or update operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },
    #[error("invalid email address: {email:?}")]
    InvalidEmail { email: String },
    #[error("{field} {date} lies in the future")]
    FutureDate { field: &'static str, date: NaiveDate },
    #[error("copy count must be positive, got {copies}")]
    NonPositiveCopies { copies: i64 },
}

/// Every way a lending or catalog operation can be refused.
///
/// Variants carry the ids and counts involved so callers can branch on the
/// kind without parsing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendingError {
    #[error("member not found: {member_id}")]
    MemberNotFound { member_id: String },
    #[error("book not found: {isbn}")]
    BookNotFound { isbn: String },
    #[error("loan not found: {loan_id}")]
    LoanNotFound { loan_id: String },
    #[error("membership of {member_id} is invalid: {reason}")]
    MembershipInvalid {
        member_id: String,
        reason: &'static str,
    },
    #[error("member {member_id} has {current} open loans (limit {max})")]
    BorrowLimitExceeded {
        member_id: String,
        current: u32,
        max: u32,
    },
    #[error("book {isbn} is not available ({status})")]
    BookNotAvailable { isbn: String, status: BookStatus },
    #[error("book {isbn} has {open_loans} open loans")]
    BookCurrentlyBorrowed { isbn: String, open_loans: usize },
    #[error("book with isbn {isbn} already exists")]
    DuplicateBook { isbn: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Lock(#[from] LockError),
}

pub type LendingResult<T> = Result<T, LendingError>;
