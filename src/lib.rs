mod clock;
mod config;
mod error;
mod ids;
mod notify;
mod stats;

pub mod events;
pub mod lending;
pub mod lock;
pub mod model;
pub mod store;

pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use config::{ConfigError, LendingConfig};
pub use error::{LendingError, LendingResult, ValidationError};
pub use events::{EventKind, EventPublisher, EventSink, LendingEvent, LogSink, SinkError};
pub use ids::{IdGenerator, IdKind, SequentialIdGenerator, TimestampIdGenerator};
pub use lending::{
    BookQuery, BookUpdate, LendingEngine, MemberUpdate, NewBook, NewMember, OverdueLoan,
};
pub use lock::{InMemoryLock, InMemoryLockManager, Lock, LockError, LockGuard, LockManager};
pub use model::{
    Address, Book, BookCategory, BookStatus, LoanRecord, LoanRef, Member, MembershipTier, Model,
    Person, TierPolicy,
};
pub use notify::{EmailNotifier, LogNotifier, NotificationService, Notifier};
pub use stats::LibraryStatistics;
pub use store::{
    HookError, InMemoryStore, LibraryStore, MemoryWriteHook, Store, StoreError, StoreWrite,
    Versioned, WriteHook,
};

#[cfg(feature = "emitter")]
pub use events::EmitterSink;

// Re-export the EventEmitter so listeners can be typed without a direct dependency
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
