//! Day-granularity date arithmetic.
//!
//! Everything above this module reasons in calendar days (`NaiveDate`).
//! "Today" is the local calendar day of the injected [`Clock`]; sessions pin
//! the day they were completed on at record time, so a later timezone or DST
//! change never moves them across days.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

/// Source of the current instant and calendar day.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day `at` falls on, in this clock's timezone.
    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate;

    fn today(&self) -> NaiveDate {
        self.day_of(self.now())
    }
}

/// Wall clock in the process-local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

/// A clock frozen at a given instant. Days are read in UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Noon UTC on `day`.
    pub fn at_day(day: NaiveDate) -> Self {
        let now = day
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self { now }
    }

    pub fn advance_days(&mut self, days: i64) {
        self.now += Duration::days(days);
    }

    pub fn advance_secs(&mut self, secs: i64) {
        self.now += Duration::seconds(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.date_naive()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        (**self).day_of(at)
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// `day` shifted by `days` (negative goes back). Saturates at the calendar bounds.
pub fn add_days(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_add_signed(Duration::days(days)).unwrap_or(if days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// Whole days from `from` to `to` (positive when `to` is later).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// The `len` days ending at `today`, oldest first.
pub fn window_ending(today: NaiveDate, len: u32) -> Vec<NaiveDate> {
    (0..len as i64)
        .rev()
        .map(|back| add_days(today, -back))
        .collect()
}
