//! Lending events and the sinks that receive them.
//!
//! After a successful mutation the engine hands one [`LendingEvent`] to its
//! [`EventPublisher`]. Delivery is best effort: a failing sink is logged and
//! skipped, and never turns a successful borrow or return into an error.

#[cfg(feature = "emitter")]
mod emitter_sink;
mod log_sink;
mod publisher;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[cfg(feature = "emitter")]
pub use emitter_sink::EmitterSink;
pub use log_sink::LogSink;
pub use publisher::{EventPublisher, EventSink, SinkError};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Borrowed,
    Returned,
    Overdue,
    BookAdded,
    BookRemoved,
    MemberRegistered,
    MemberUpdated,
    MemberDeactivated,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Borrowed => "Borrowed",
            EventKind::Returned => "Returned",
            EventKind::Overdue => "Overdue",
            EventKind::BookAdded => "BookAdded",
            EventKind::BookRemoved => "BookRemoved",
            EventKind::MemberRegistered => "MemberRegistered",
            EventKind::MemberUpdated => "MemberUpdated",
            EventKind::MemberDeactivated => "MemberDeactivated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact about a completed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingEvent {
    pub id: String,
    pub kind: EventKind,
    pub description: String,
    pub occurred_at: NaiveDateTime,
    pub member_id: Option<String>,
    pub isbn: Option<String>,
    pub loan_id: Option<String>,
}

impl LendingEvent {
    pub fn new(
        id: impl Into<String>,
        kind: EventKind,
        description: impl Into<String>,
        occurred_at: NaiveDateTime,
    ) -> Self {
        LendingEvent {
            id: id.into(),
            kind,
            description: description.into(),
            occurred_at,
            member_id: None,
            isbn: None,
            loan_id: None,
        }
    }

    pub fn with_member(mut self, member_id: impl Into<String>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    pub fn with_book(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_loan(mut self, loan_id: impl Into<String>) -> Self {
        self.loan_id = Some(loan_id.into());
        self
    }
}

impl fmt::Display for LendingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.occurred_at, self.kind, self.description)
    }
}
