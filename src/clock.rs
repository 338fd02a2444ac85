//! Time source for the lending engine.

use std::sync::Mutex;

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Supplies "today" to borrow, return and overdue logic.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn now(&self) -> NaiveDateTime {
        self.today().and_time(NaiveTime::MIN)
    }
}

/// Wall-clock local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        ManualClock {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        if let Ok(mut current) = self.today.lock() {
            *current = today;
        }
    }

    pub fn advance_days(&self, days: u64) {
        if let Ok(mut current) = self.today.lock() {
            if let Some(next) = current.checked_add_days(Days::new(days)) {
                *current = next;
            }
        }
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        match self.today.lock() {
            Ok(today) => *today,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
