use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Postal address of a person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Address {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    pub fn full_address(&self) -> String {
        format!(
            "{}, {} {}, {}",
            self.street, self.city, self.postal_code, self.country
        )
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_address())
    }
}

/// Personal details shared by anyone the library knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub address: Address,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in calendar years, matching how the membership desk computes it.
    pub fn age(&self, today: NaiveDate) -> i32 {
        today.year() - self.date_of_birth.year()
    }
}

/// Membership classification of a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipTier {
    #[default]
    Basic,
    Premium,
    Student,
    Faculty,
}

impl MembershipTier {
    pub const ALL: [MembershipTier; 4] = [
        MembershipTier::Basic,
        MembershipTier::Premium,
        MembershipTier::Student,
        MembershipTier::Faculty,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MembershipTier::Basic => "Basic",
            MembershipTier::Premium => "Premium",
            MembershipTier::Student => "Student",
            MembershipTier::Faculty => "Faculty",
        }
    }

    /// Built-in limits for the tier. [`crate::LendingConfig`] can override them.
    pub fn default_policy(&self) -> TierPolicy {
        match self {
            MembershipTier::Basic => TierPolicy::new(3, 14, 0),
            MembershipTier::Premium => TierPolicy::new(5, 21, 0),
            MembershipTier::Student => TierPolicy::new(4, 28, 0),
            MembershipTier::Faculty => TierPolicy::new(10, 30, 0),
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Borrowing limits attached to a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicy {
    pub max_concurrent_loans: u32,
    pub max_loan_days: u32,
    /// Fee charged per overdue day, in minor currency units.
    pub late_fee_per_day: u64,
}

impl TierPolicy {
    pub const fn new(max_concurrent_loans: u32, max_loan_days: u32, late_fee_per_day: u64) -> Self {
        TierPolicy {
            max_concurrent_loans,
            max_loan_days,
            late_fee_per_day,
        }
    }

    /// Fee for `overdue_days`; negative day counts cost nothing.
    pub fn late_fee(&self, overdue_days: i64) -> u64 {
        u64::try_from(overdue_days)
            .unwrap_or(0)
            .saturating_mul(self.late_fee_per_day)
    }
}

/// Back-reference from a member to one of their loans.
///
/// The entity store owns the loan record; this entry only mirrors enough of it
/// (the return date) to count open loans without a store lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRef {
    pub loan_id: String,
    pub book_isbn: String,
    pub returned_on: Option<NaiveDate>,
}

impl LoanRef {
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }
}

/// A registered library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: String,
    person: Person,
    tier: MembershipTier,
    membership_date: NaiveDate,
    active: bool,
    loans: Vec<LoanRef>,
}

impl Member {
    pub fn new(
        id: impl Into<String>,
        person: Person,
        tier: MembershipTier,
        membership_date: NaiveDate,
    ) -> Self {
        Member {
            id: id.into(),
            person,
            tier,
            membership_date,
            active: true,
            loans: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn person_mut(&mut self) -> &mut Person {
        &mut self.person
    }

    pub fn full_name(&self) -> String {
        self.person.full_name()
    }

    pub fn email(&self) -> &str {
        &self.person.email
    }

    pub fn tier(&self) -> MembershipTier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: MembershipTier) {
        self.tier = tier;
    }

    pub fn membership_date(&self) -> NaiveDate {
        self.membership_date
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Loan references in the order they were opened.
    pub fn loans(&self) -> &[LoanRef] {
        &self.loans
    }

    /// Number of loans not yet returned.
    pub fn current_borrowed_count(&self) -> u32 {
        let open = self.loans.iter().filter(|loan| loan.is_open()).count();
        u32::try_from(open).unwrap_or(u32::MAX)
    }

    /// Whether the member may open one more loan under `policy`.
    ///
    /// Only open loans count against the limit; returned loans are history.
    pub fn can_borrow_more(&self, policy: &TierPolicy) -> bool {
        self.active && self.current_borrowed_count() < policy.max_concurrent_loans
    }

    pub fn add_loan(&mut self, loan_id: impl Into<String>, book_isbn: impl Into<String>) {
        self.loans.push(LoanRef {
            loan_id: loan_id.into(),
            book_isbn: book_isbn.into(),
            returned_on: None,
        });
    }

    /// Mirror a loan closure. Returns `false` if the reference is unknown or
    /// already closed.
    pub fn close_loan(&mut self, loan_id: &str, returned_on: NaiveDate) -> bool {
        match self
            .loans
            .iter_mut()
            .find(|loan| loan.loan_id == loan_id && loan.is_open())
        {
            Some(loan) => {
                loan.returned_on = Some(returned_on);
                true
            }
            None => false,
        }
    }

    /// Position of a loan in the member's chronological list.
    pub fn loan_position(&self, loan_id: &str) -> Option<usize> {
        self.loans.iter().position(|loan| loan.loan_id == loan_id)
    }

    /// Calendar years since joining, counted like [`Person::age`].
    pub fn membership_years(&self, today: NaiveDate) -> i32 {
        today.year() - self.membership_date.year()
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}, {}, {} borrowed)",
            self.id,
            self.full_name(),
            self.tier,
            if self.active { "active" } else { "inactive" },
            self.current_borrowed_count()
        )
    }
}
