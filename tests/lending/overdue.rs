use std::sync::Arc;

use lending_ledger::{EmailNotifier, LendingError, MembershipTier};

use crate::support::{date, library};

#[test]
fn zero_fee_tier_is_overdue_but_charged_nothing() {
    let lib = library();
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    let loan = lib
        .engine
        .borrow_book(member.id(), "A", date(2024, 1, 15))
        .unwrap();

    lib.set_today(date(2024, 1, 15));
    assert!(lib.engine.overdue_loans().is_empty());

    lib.set_today(date(2024, 1, 20));
    let overdue = lib.engine.overdue_loans();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].overdue_days(date(2024, 1, 20)), 5);

    assert!(lib.engine.return_book(member.id(), "A").unwrap());
    let closed = lib.engine.loan(loan.id()).unwrap();
    assert_eq!(closed.return_date(), Some(date(2024, 1, 20)));
    assert_eq!(closed.late_fee(), 0);
    assert!(lib.engine.overdue_loans().is_empty());
}

#[test]
fn report_joins_book_and_member_most_overdue_first() {
    let lib = library();
    let m1 = lib.member(MembershipTier::Basic);
    let m2 = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    lib.book("B", 1);

    lib.engine.borrow_book(m1.id(), "A", date(2024, 1, 10)).unwrap();
    lib.engine.borrow_book(m2.id(), "B", date(2024, 1, 5)).unwrap();

    lib.set_today(date(2024, 1, 12));
    let report = lib.engine.overdue_report();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].book.isbn(), "B");
    assert_eq!(report[0].member.id(), m2.id());
    assert_eq!(report[0].days_overdue, 7);
    assert_eq!(report[1].book.isbn(), "A");
    assert_eq!(report[1].days_overdue, 2);
    assert!(report[0].to_string().contains("Days Overdue: 7"));
}

#[test]
fn reminders_go_to_reachable_members() {
    let notifier = Arc::new(EmailNotifier::new());
    let mut lib = library();
    lib.engine = lib.engine.with_notifier(notifier.clone());

    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();

    assert_eq!(lib.engine.notify_overdue(), 0);

    lib.set_today(date(2024, 1, 18));
    assert_eq!(lib.engine.notify_overdue(), 1);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, member.email());
    assert!(sent[0].1.contains("3 day(s) overdue"));
}

#[test]
fn extension_moves_due_date_of_open_loans_only() {
    let lib = library();
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    let loan = lib
        .engine
        .borrow_book(member.id(), "A", date(2024, 1, 15))
        .unwrap();

    assert_eq!(lib.engine.extend_due_date(loan.id(), 0), Ok(false));
    assert_eq!(lib.engine.extend_due_date(loan.id(), 7), Ok(true));
    assert_eq!(
        lib.engine.loan(loan.id()).unwrap().due_date(),
        date(2024, 1, 22)
    );

    lib.set_today(date(2024, 1, 20));
    assert!(lib.engine.overdue_loans().is_empty());

    lib.engine.return_book(member.id(), "A").unwrap();
    assert_eq!(lib.engine.extend_due_date(loan.id(), 7), Ok(false));
    assert_eq!(
        lib.engine.extend_due_date("LOAN-404", 7),
        Err(LendingError::LoanNotFound {
            loan_id: "LOAN-404".into()
        })
    );
}
