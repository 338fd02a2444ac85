//! The lending engine: the only component that opens or closes loans.
//!
//! Every operation locks the entities it touches (member first, then book),
//! reads them from the [`LibraryStore`](crate::store::LibraryStore), decides
//! admissibility against the inventory and membership rules, and only then
//! writes. A refused borrow leaves the store untouched.

mod catalog;
mod engine;
mod overdue;
mod validation;

pub use catalog::{BookQuery, BookUpdate, MemberUpdate, NewBook, NewMember};
pub use engine::LendingEngine;
pub use overdue::OverdueLoan;
