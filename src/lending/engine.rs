use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use super::OverdueLoan;
use crate::clock::{Clock, SystemClock};
use crate::config::LendingConfig;
use crate::error::{LendingError, LendingResult};
use crate::events::{EventKind, EventPublisher, EventSink, LendingEvent};
use crate::ids::{IdGenerator, IdKind, TimestampIdGenerator};
use crate::lock::{book_key, member_key, InMemoryLockManager, LockManager};
use crate::model::{LoanRecord, Member, MembershipTier, TierPolicy};
use crate::notify::Notifier;
use crate::stats::LibraryStatistics;
use crate::store::{LibraryStore, StoreError, Versioned};

/// Book writes tried per return before giving up on a contended entry.
const RESTOCK_ATTEMPTS: u32 = 8;

/// Orchestrates borrow and return against the entity store.
///
/// Collaborators (ids, clock, sinks, notifier) are injected so tests can pin
/// them down.
pub struct LendingEngine<LM: LockManager = InMemoryLockManager> {
    pub(super) store: LibraryStore,
    pub(super) locks: Arc<LM>,
    pub(super) ids: Arc<dyn IdGenerator>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) config: LendingConfig,
    pub(super) events: EventPublisher,
    notifier: Option<Arc<dyn Notifier>>,
}

impl LendingEngine<InMemoryLockManager> {
    /// Engine over `store` with in-process locks, timestamp ids, the system
    /// clock and the default tier table.
    pub fn new(store: LibraryStore) -> Self {
        LendingEngine {
            store,
            locks: Arc::new(InMemoryLockManager::new()),
            ids: Arc::new(TimestampIdGenerator::new()),
            clock: Arc::new(SystemClock),
            config: LendingConfig::default(),
            events: EventPublisher::new(),
            notifier: None,
        }
    }
}

impl<LM: LockManager> LendingEngine<LM> {
    pub fn with_lock_manager<L: LockManager>(self, locks: Arc<L>) -> LendingEngine<L> {
        LendingEngine {
            store: self.store,
            locks,
            ids: self.ids,
            clock: self.clock,
            config: self.config,
            events: self.events,
            notifier: self.notifier,
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: LendingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sink(self, sink: Arc<dyn EventSink>) -> Self {
        self.events.subscribe(sink);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(super) fn policy(&self, tier: MembershipTier) -> TierPolicy {
        *self.config.policy(tier)
    }

    /// Open a loan of `isbn` to `member_id`, due on `due_date`.
    ///
    /// Checks run in a fixed order (member exists, member active, book
    /// exists, borrowing limit, availability) and all of them pass before
    /// anything is written. Writes then go book, loan, member.
    pub fn borrow_book(
        &self,
        member_id: &str,
        isbn: &str,
        due_date: NaiveDate,
    ) -> LendingResult<LoanRecord> {
        self.borrow_with(member_id, isbn, |_, _| due_date)
    }

    /// Borrow for the full loan period of the member's tier.
    pub fn borrow_for_loan_period(&self, member_id: &str, isbn: &str) -> LendingResult<LoanRecord> {
        self.borrow_with(member_id, isbn, |policy, today| {
            today
                .checked_add_days(Days::new(u64::from(policy.max_loan_days)))
                .unwrap_or_else(|| {
                    warn!(
                        member_id,
                        isbn,
                        days = policy.max_loan_days,
                        "loan period runs past the calendar; due today"
                    );
                    today
                })
        })
    }

    /// Shared borrow path. `due` picks the due date from the member's tier
    /// policy and today's date once the member lock is held.
    fn borrow_with<F>(&self, member_id: &str, isbn: &str, due: F) -> LendingResult<LoanRecord>
    where
        F: FnOnce(&TierPolicy, NaiveDate) -> NaiveDate,
    {
        let (loan, member, book) = {
            let _member_guard = self.locks.acquire(&member_key(member_id))?;

            let mut member = self.store.members().get(member_id).ok_or_else(|| {
                warn!(member_id, isbn, "borrow refused: unknown member");
                LendingError::MemberNotFound {
                    member_id: member_id.to_string(),
                }
            })?;

            if !member.is_active() {
                warn!(member_id, isbn, "borrow refused: inactive member");
                return Err(LendingError::MembershipInvalid {
                    member_id: member_id.to_string(),
                    reason: "member is not active",
                });
            }

            let _book_guard = self.locks.acquire(&book_key(isbn))?;

            let Versioned {
                data: mut book,
                version: book_version,
            } = self.store.books().get_versioned(isbn).ok_or_else(|| {
                warn!(member_id, isbn, "borrow refused: unknown book");
                LendingError::BookNotFound {
                    isbn: isbn.to_string(),
                }
            })?;

            let policy = self.policy(member.tier());
            if !member.can_borrow_more(&policy) {
                let current = member.current_borrowed_count();
                warn!(
                    member_id,
                    isbn,
                    current,
                    max = policy.max_concurrent_loans,
                    "borrow refused: limit reached"
                );
                return Err(LendingError::BorrowLimitExceeded {
                    member_id: member_id.to_string(),
                    current,
                    max: policy.max_concurrent_loans,
                });
            }

            if !book.mark_borrowed() {
                warn!(member_id, isbn, status = %book.status(), "borrow refused: no copy available");
                return Err(LendingError::BookNotAvailable {
                    isbn: isbn.to_string(),
                    status: book.status(),
                });
            }

            let today = self.clock.today();
            let loan = LoanRecord::new(
                self.ids.next_id(IdKind::Loan),
                member_id,
                isbn,
                today,
                due(&policy, today),
            );

            self.store.books().put_if_version(&book, book_version)?;
            self.store.loans().put(&loan);
            member.add_loan(loan.id(), isbn);
            self.store.members().put(&member);

            (loan, member, book)
        };

        info!(
            member_id,
            isbn,
            loan_id = %loan.id(),
            due = %loan.due_date(),
            available = book.available_copies(),
            "book borrowed"
        );
        // Locks are released here so sinks may call back into the engine.
        self.publish(
            LendingEvent::new(
                self.ids.next_id(IdKind::Event),
                EventKind::Borrowed,
                format!(
                    "{} borrowed \"{}\", due {}",
                    member.full_name(),
                    book.title(),
                    loan.due_date()
                ),
                self.clock.now(),
            )
            .with_member(member_id)
            .with_book(isbn)
            .with_loan(loan.id()),
        );

        Ok(loan)
    }

    /// Close the earliest open loan of `isbn` held by `member_id`.
    ///
    /// Returns `Ok(false)` and changes nothing when there is no such loan.
    /// A late return is charged at the member's tier rate. If the book
    /// already shows every copy on the shelf the loan is still closed, but
    /// availability is not credited twice.
    ///
    /// The member's reference to the loan is closed even when crediting the
    /// copy back fails; that failure is then returned.
    pub fn return_book(&self, member_id: &str, isbn: &str) -> LendingResult<bool> {
        let loan = {
            let _member_guard = self.locks.acquire(&member_key(member_id))?;

            let member = self.store.members().get(member_id);
            let Some(mut loan) = self.find_open_loan(member_id, isbn, member.as_ref()) else {
                warn!(member_id, isbn, "return ignored: no open loan");
                return Ok(false);
            };

            let policy = match &member {
                Some(member) => self.policy(member.tier()),
                None => {
                    warn!(member_id, loan_id = %loan.id(), "returning loan of unknown member at default tier");
                    self.policy(MembershipTier::default())
                }
            };

            let today = self.clock.today();
            if !loan.close(today, &policy) {
                return Ok(false);
            }

            let _book_guard = self.locks.acquire(&book_key(isbn))?;

            self.store.loans().put(&loan);
            let restocked = self.restock(isbn, loan.id());

            if let Some(mut member) = member {
                if member.close_loan(loan.id(), today) {
                    self.store.members().put(&member);
                }
            }

            restocked?;
            loan
        };

        info!(
            member_id,
            isbn,
            loan_id = %loan.id(),
            late_fee = loan.late_fee(),
            "book returned"
        );
        self.publish(
            LendingEvent::new(
                self.ids.next_id(IdKind::Event),
                EventKind::Returned,
                format!(
                    "loan {} of {} returned by {} (late fee {})",
                    loan.id(),
                    isbn,
                    member_id,
                    loan.late_fee()
                ),
                self.clock.now(),
            )
            .with_member(member_id)
            .with_book(isbn)
            .with_loan(loan.id()),
        );

        Ok(true)
    }

    /// Put one copy of `isbn` back on the shelf. Caller holds the book lock;
    /// a version conflict means someone wrote the book outside this engine,
    /// so the book is re-read and the credit applied again.
    fn restock(&self, isbn: &str, loan_id: &str) -> LendingResult<()> {
        let mut attempt = 1;
        loop {
            let Some(Versioned {
                data: mut book,
                version,
            }) = self.store.books().get_versioned(isbn)
            else {
                warn!(isbn, loan_id, "returned book no longer in catalog");
                return Ok(());
            };

            if !book.mark_returned() {
                warn!(isbn, loan_id, "book already fully available; copy count left unchanged");
                return Ok(());
            }

            match self.store.books().put_if_version(&book, version) {
                Ok(_) => return Ok(()),
                Err(StoreError::VersionConflict { actual, .. }) if attempt < RESTOCK_ATTEMPTS => {
                    warn!(isbn, loan_id, expected = version, actual, attempt, "book changed during return; retrying");
                    attempt += 1;
                }
                Err(err) => {
                    warn!(isbn, loan_id, error = %err, "could not credit returned copy");
                    return Err(err.into());
                }
            }
        }
    }

    /// Push an open loan's due date forward by `additional_days`.
    ///
    /// `Ok(false)` when the loan is closed or the extension is not positive.
    pub fn extend_due_date(&self, loan_id: &str, additional_days: i64) -> LendingResult<bool> {
        let member_id = self
            .store
            .loans()
            .get(loan_id)
            .map(|loan| loan.member_id().to_string())
            .ok_or_else(|| LendingError::LoanNotFound {
                loan_id: loan_id.to_string(),
            })?;

        let _member_guard = self.locks.acquire(&member_key(&member_id))?;

        let mut loan = self
            .store
            .loans()
            .get(loan_id)
            .ok_or_else(|| LendingError::LoanNotFound {
                loan_id: loan_id.to_string(),
            })?;

        if !loan.extend_due_date(additional_days) {
            warn!(loan_id, additional_days, "extension refused");
            return Ok(false);
        }

        self.store.loans().put(&loan);
        info!(loan_id, due = %loan.due_date(), "due date extended");
        Ok(true)
    }

    pub fn loan(&self, loan_id: &str) -> Option<LoanRecord> {
        self.store.loans().get(loan_id)
    }

    /// Every loan ever opened by a member, oldest first.
    pub fn member_history(&self, member_id: &str) -> Vec<LoanRecord> {
        debug!(member_id, "loading borrowing history");
        let member = self.store.members().get(member_id);
        let mut loans = self
            .store
            .loans()
            .find(&|loan: &LoanRecord| loan.member_id() == member_id);
        loans.sort_by_key(|loan| Self::chronological_key(loan, member.as_ref()));
        loans
    }

    pub fn active_loans(&self) -> Vec<LoanRecord> {
        debug!("loading open loans");
        self.store.loans().find(&|loan: &LoanRecord| loan.is_open())
    }

    /// Open loans past their due date as of today.
    pub fn overdue_loans(&self) -> Vec<LoanRecord> {
        let today = self.clock.today();
        debug!(%today, "loading overdue loans");
        self.store
            .loans()
            .find(&|loan: &LoanRecord| loan.is_overdue(today))
    }

    /// Overdue loans joined with their book and member. Loans whose book or
    /// member has since disappeared are left out.
    pub fn overdue_report(&self) -> Vec<OverdueLoan> {
        let today = self.clock.today();
        let mut report: Vec<OverdueLoan> = self
            .overdue_loans()
            .into_iter()
            .filter_map(|loan| {
                let book = self.store.books().get(loan.book_isbn())?;
                let member = self.store.members().get(loan.member_id())?;
                let days_overdue = loan.overdue_days(today);
                Some(OverdueLoan {
                    book,
                    member,
                    loan,
                    days_overdue,
                })
            })
            .collect();
        report.sort_by(|a, b| {
            b.days_overdue
                .cmp(&a.days_overdue)
                .then_with(|| a.loan.id().cmp(b.loan.id()))
        });
        report
    }

    /// Publish an overdue event for every overdue loan and remind the member
    /// through the notifier, if one is configured. Returns the number of
    /// reminders handed off.
    pub fn notify_overdue(&self) -> usize {
        let mut reminded = 0;
        for overdue in self.overdue_report() {
            self.publish(
                LendingEvent::new(
                    self.ids.next_id(IdKind::Event),
                    EventKind::Overdue,
                    format!(
                        "loan {} is {} day(s) overdue",
                        overdue.loan.id(),
                        overdue.days_overdue
                    ),
                    self.clock.now(),
                )
                .with_member(overdue.member.id())
                .with_book(overdue.book.isbn())
                .with_loan(overdue.loan.id()),
            );

            let Some(notifier) = &self.notifier else {
                continue;
            };
            if !notifier.is_available(&overdue.member) {
                debug!(member_id = %overdue.member.id(), "no notification channel for member");
                continue;
            }
            if notifier.notify(&overdue.member, &overdue.reminder()) {
                reminded += 1;
            } else {
                warn!(member_id = %overdue.member.id(), loan_id = %overdue.loan.id(), "overdue reminder not delivered");
            }
        }
        reminded
    }

    pub fn statistics(&self) -> LibraryStatistics {
        LibraryStatistics::collect(&self.store, self.clock.today())
    }

    pub(super) fn publish(&self, event: LendingEvent) {
        self.events.publish(&event);
    }

    /// Earliest-borrowed open loan for the pair; ties go to the loan the
    /// member opened first.
    fn find_open_loan(
        &self,
        member_id: &str,
        isbn: &str,
        member: Option<&Member>,
    ) -> Option<LoanRecord> {
        self.store
            .loans()
            .find(&|loan: &LoanRecord| {
                loan.is_open() && loan.member_id() == member_id && loan.book_isbn() == isbn
            })
            .into_iter()
            .min_by_key(|loan| Self::chronological_key(loan, member))
    }

    fn chronological_key(loan: &LoanRecord, member: Option<&Member>) -> (NaiveDate, usize, String) {
        let position = member
            .and_then(|member| member.loan_position(loan.id()))
            .unwrap_or(usize::MAX);
        (loan.borrow_date(), position, loan.id().to_string())
    }
}
