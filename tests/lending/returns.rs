use lending_ledger::{
    BookStatus, LendingConfig, LibraryStore, MembershipTier, Store, TierPolicy,
};

use crate::support::{date, library, library_with};

#[test]
fn borrow_then_return_restores_the_book() {
    let lib = library();
    let member = lib.member(MembershipTier::Basic);
    let before = lib.book("A", 3);

    lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();
    assert!(lib.engine.return_book(member.id(), "A").unwrap());

    let after = lib.engine.find_book("A").unwrap();
    assert_eq!(after.available_copies(), before.available_copies());
    assert_eq!(after.status(), before.status());

    let member = lib.engine.find_member(member.id()).unwrap();
    assert_eq!(member.current_borrowed_count(), 0);
    assert_eq!(member.loans()[0].returned_on, Some(date(2024, 1, 1)));
}

#[test]
fn return_without_open_loan_changes_nothing() {
    let lib = library();
    let member = lib.member(MembershipTier::Basic);
    let other = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    lib.engine.borrow_book(other.id(), "A", date(2024, 1, 15)).unwrap();

    let books = lib.engine.books();
    let loans = lib.engine.store().loans().list();

    assert_eq!(lib.engine.return_book(member.id(), "A"), Ok(false));
    assert_eq!(lib.engine.return_book("MEM-404", "A"), Ok(false));
    assert_eq!(lib.engine.return_book(other.id(), "nope"), Ok(false));

    assert_eq!(lib.engine.books(), books);
    assert_eq!(lib.engine.store().loans().list(), loans);
}

#[test]
fn second_return_is_false_and_keeps_fee() {
    let config = LendingConfig::default()
        .with_policy(MembershipTier::Basic, TierPolicy::new(3, 14, 25));
    let lib = library_with(LibraryStore::in_memory(), config);
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);

    let loan = lib
        .engine
        .borrow_book(member.id(), "A", date(2024, 1, 15))
        .unwrap();

    lib.set_today(date(2024, 1, 20));
    assert_eq!(lib.engine.return_book(member.id(), "A"), Ok(true));
    let closed = lib.engine.loan(loan.id()).unwrap();
    assert_eq!(closed.late_fee(), 125);

    lib.set_today(date(2024, 2, 20));
    assert_eq!(lib.engine.return_book(member.id(), "A"), Ok(false));

    let still = lib.engine.loan(loan.id()).unwrap();
    assert_eq!(still.return_date(), Some(date(2024, 1, 20)));
    assert_eq!(still.late_fee(), 125);
    assert_eq!(lib.engine.find_book("A").unwrap().available_copies(), 1);
}

#[test]
fn late_fee_uses_member_tier_rate() {
    let config = LendingConfig::default()
        .with_policy(MembershipTier::Basic, TierPolicy::new(3, 14, 10))
        .with_policy(MembershipTier::Premium, TierPolicy::new(5, 21, 4));
    let lib = library_with(LibraryStore::in_memory(), config);
    let basic = lib.member(MembershipTier::Basic);
    let premium = lib.member(MembershipTier::Premium);
    lib.book("A", 2);

    let a = lib.engine.borrow_book(basic.id(), "A", date(2024, 1, 10)).unwrap();
    let b = lib.engine.borrow_book(premium.id(), "A", date(2024, 1, 10)).unwrap();

    lib.set_today(date(2024, 1, 17));
    lib.engine.return_book(basic.id(), "A").unwrap();
    lib.engine.return_book(premium.id(), "A").unwrap();

    assert_eq!(lib.engine.loan(a.id()).unwrap().late_fee(), 70);
    assert_eq!(lib.engine.loan(b.id()).unwrap().late_fee(), 28);
}

#[test]
fn on_time_return_is_free() {
    let config = LendingConfig::default()
        .with_policy(MembershipTier::Basic, TierPolicy::new(3, 14, 50));
    let lib = library_with(LibraryStore::in_memory(), config);
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    let loan = lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();

    lib.set_today(date(2024, 1, 15));
    lib.engine.return_book(member.id(), "A").unwrap();
    assert_eq!(lib.engine.loan(loan.id()).unwrap().late_fee(), 0);
}

#[test]
fn earliest_open_loan_is_returned_first() {
    let lib = library();
    let member = lib.member(MembershipTier::Premium);
    lib.book("A", 3);

    let first = lib.engine.borrow_book(member.id(), "A", date(2024, 1, 10)).unwrap();
    lib.set_today(date(2024, 1, 3));
    let second = lib.engine.borrow_book(member.id(), "A", date(2024, 1, 20)).unwrap();

    lib.set_today(date(2024, 1, 5));
    assert!(lib.engine.return_book(member.id(), "A").unwrap());

    assert!(lib.engine.loan(first.id()).unwrap().is_returned());
    assert!(lib.engine.loan(second.id()).unwrap().is_open());
    assert_eq!(lib.engine.find_book("A").unwrap().available_copies(), 2);
}

#[test]
fn return_onto_full_shelf_closes_loan_without_inflating() {
    let lib = library();
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    let loan = lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();

    // Someone put the copy back by hand.
    lib.engine.set_book_status("A", BookStatus::Available).unwrap();

    assert!(lib.engine.return_book(member.id(), "A").unwrap());
    assert!(lib.engine.loan(loan.id()).unwrap().is_returned());

    let book = lib.engine.find_book("A").unwrap();
    assert_eq!(book.available_copies(), 1);
    assert_eq!(book.total_copies(), 1);
}

#[test]
fn deactivated_member_can_still_return() {
    let lib = library();
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();
    lib.engine.deactivate_member(member.id()).unwrap();

    assert!(lib.engine.return_book(member.id(), "A").unwrap());
    assert!(lib.engine.find_book("A").unwrap().is_available());
}

#[test]
fn history_lists_every_loan_in_order() {
    let lib = library();
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    lib.book("B", 1);

    lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();
    lib.set_today(date(2024, 1, 4));
    lib.engine.return_book(member.id(), "A").unwrap();
    lib.engine.borrow_book(member.id(), "B", date(2024, 1, 20)).unwrap();

    let history: Vec<_> = lib
        .engine
        .member_history(member.id())
        .into_iter()
        .map(|loan| (loan.book_isbn().to_string(), loan.is_open()))
        .collect();
    assert_eq!(
        history,
        vec![("A".to_string(), false), ("B".to_string(), true)]
    );
    assert_eq!(lib.engine.active_loans().len(), 1);
}
