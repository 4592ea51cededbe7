//! Three-bucket spaced-repetition rule.
//!
//! | rating | interval                     | ease streak |
//! |--------|------------------------------|-------------|
//! | easy   | `min(30, interval * 2)`      | `+1`        |
//! | medium | clamped into `[2, 14]`       | reset       |
//! | hard   | `1`                          | reset       |
//!
//! The next review is always `today + interval`.

use chrono::NaiveDate;

use crate::clock::add_days;
use crate::model::{Difficulty, Subject};

pub const MAX_EASY_INTERVAL_DAYS: u32 = 30;
pub const MIN_MEDIUM_INTERVAL_DAYS: u32 = 2;
pub const MAX_MEDIUM_INTERVAL_DAYS: u32 = 14;

/// Interval and ease streak after a rating, before any date is assigned.
pub fn next_interval(interval_days: u32, ease_streak: u32, difficulty: Difficulty) -> (u32, u32) {
    let interval_days = interval_days.max(1);
    match difficulty {
        Difficulty::Easy => (
            interval_days
                .saturating_mul(2)
                .min(MAX_EASY_INTERVAL_DAYS),
            ease_streak.saturating_add(1),
        ),
        Difficulty::Medium => (
            interval_days.clamp(MIN_MEDIUM_INTERVAL_DAYS, MAX_MEDIUM_INTERVAL_DAYS),
            0,
        ),
        Difficulty::Hard => (1, 0),
    }
}

/// Reschedule `subject` after a rating given on `today`.
pub fn apply_feedback(subject: &Subject, difficulty: Difficulty, today: NaiveDate) -> Subject {
    let (interval_days, ease_streak) =
        next_interval(subject.interval_days, subject.ease_streak, difficulty);
    Subject {
        interval_days,
        ease_streak,
        next_review_date: Some(add_days(today, interval_days as i64)),
        ..subject.clone()
    }
}
