//! Lending engine integration tests.
//!
//! - Borrow admissibility and the ordering of checks
//! - Return, late fees and double-return handling
//! - Overdue queries, reminders and due-date extension
//! - Event delivery and the store's write order
//! - Returns against a book store with outside writers

#[path = "../support/mod.rs"]
mod support;

mod contention;
mod events;
mod overdue;
mod returns;
