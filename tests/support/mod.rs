//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use lending_ledger::{
    Address, Book, BookCategory, LendingConfig, LendingEngine, LibraryStore, ManualClock, Member,
    MembershipTier, NewBook, NewMember, Person, SequentialIdGenerator,
};

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Engine over an in-memory store with a hand-driven clock and
/// predictable ids (`MEM-1`, `LOAN-1`, ...).
pub struct Library {
    pub engine: LendingEngine,
    pub clock: Arc<ManualClock>,
}

pub fn library() -> Library {
    library_with(LibraryStore::in_memory(), LendingConfig::default())
}

pub fn library_with(store: LibraryStore, config: LendingConfig) -> Library {
    init_tracing();
    let clock = Arc::new(ManualClock::new(date(2024, 1, 1)));
    let engine = LendingEngine::new(store)
        .with_clock(clock.clone())
        .with_id_generator(Arc::new(SequentialIdGenerator::new()))
        .with_config(config);
    Library { engine, clock }
}

impl Library {
    pub fn member(&self, tier: MembershipTier) -> Member {
        self.engine
            .register_member(NewMember {
                person: person("Member"),
                tier,
            })
            .unwrap()
    }

    pub fn book(&self, isbn: &str, copies: i64) -> Book {
        self.engine
            .add_book(NewBook {
                isbn: isbn.into(),
                title: format!("Title {}", isbn),
                author: "Author".into(),
                publisher: "Publisher".into(),
                publication_date: date(2001, 5, 1),
                category: BookCategory::Fiction,
                total_copies: copies,
            })
            .unwrap()
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.clock.set(today);
    }
}

pub fn person(last_name: &str) -> Person {
    Person {
        first_name: "Test".into(),
        last_name: last_name.into(),
        email: format!("{}@library.test", last_name.to_lowercase()),
        date_of_birth: date(1995, 4, 12),
        address: Address::new("12 Reading Lane", "Bookham", "BK1 2AB", "UK"),
    }
}
