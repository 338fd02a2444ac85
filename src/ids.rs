//! Unique id generation for entities and events.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// The kind of thing an id is issued for; each kind gets its own prefix.
/// Books are keyed by ISBN and never get a generated id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Member,
    Loan,
    Event,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Member => "MEM",
            IdKind::Loan => "LOAN",
            IdKind::Event => "EVT",
        }
    }
}

/// Source of ids that are never reissued within the process lifetime.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, kind: IdKind) -> String;
}

/// `PREFIX_<unix millis>_<sequence>`; the shared sequence keeps ids distinct
/// even when the clock stands still or steps back.
#[derive(Debug)]
pub struct TimestampIdGenerator {
    sequence: AtomicU64,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        TimestampIdGenerator {
            sequence: AtomicU64::new(1),
        }
    }
}

impl Default for TimestampIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{}", kind.prefix(), Utc::now().timestamp_millis(), seq)
    }
}

/// `PREFIX-<n>` with one counter per kind. Deterministic, for tests and demos.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    members: AtomicU64,
    loans: AtomicU64,
    events: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: IdKind) -> &AtomicU64 {
        match kind {
            IdKind::Member => &self.members,
            IdKind::Loan => &self.loans,
            IdKind::Event => &self.events,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        let n = self.counter(kind).fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", kind.prefix(), n)
    }
}
