//! Due list and per-subject statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{add_days, days_between};
use crate::model::{Difficulty, StudyState, Subject};

pub const DEFAULT_RECENT_WINDOW_DAYS: u32 = 7;

/// Subjects due on or before `today`, earliest review first.
/// Ties keep insertion order.
pub fn due_today(state: &StudyState, today: NaiveDate) -> Vec<&Subject> {
    let mut due: Vec<&Subject> = state.subjects.iter().filter(|s| s.is_due(today)).collect();
    due.sort_by_key(|s| s.review_date_or(today));
    due
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStats {
    pub subject_id: String,
    pub name: String,
    pub color: String,
    pub total_sessions: u32,
    /// Sessions within the last `window_days` days, today included.
    pub recent_sessions: u32,
    pub window_days: u32,
    pub due: bool,
    pub next_review_date: NaiveDate,
    pub interval_days: u32,
    pub ease_streak: u32,
    /// Negative once the exam is past.
    pub days_until_exam: i64,
    pub last_difficulty: Option<Difficulty>,
}

/// Statistics for every subject, in insertion order.
pub fn subject_stats(state: &StudyState, today: NaiveDate, window_days: u32) -> Vec<SubjectStats> {
    let window_days = window_days.max(1);
    let window_start = add_days(today, -(window_days as i64 - 1));

    state
        .subjects
        .iter()
        .map(|subject| {
            let mut total_sessions = 0;
            let mut recent_sessions = 0;
            let mut last_difficulty = None;
            for session in state.sessions_for(&subject.id) {
                total_sessions += 1;
                if session.day >= window_start && session.day <= today {
                    recent_sessions += 1;
                }
                if session.difficulty.is_some() {
                    last_difficulty = session.difficulty;
                }
            }
            SubjectStats {
                subject_id: subject.id.clone(),
                name: subject.name.clone(),
                color: subject.color.clone(),
                total_sessions,
                recent_sessions,
                window_days,
                due: subject.is_due(today),
                next_review_date: subject.review_date_or(today),
                interval_days: subject.interval_days,
                ease_streak: subject.ease_streak,
                days_until_exam: days_between(today, subject.exam_date),
                last_difficulty,
            }
        })
        .collect()
}

/// A session joined with its subject's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub subject_name: String,
    pub minutes: u32,
    pub day: NaiveDate,
    pub difficulty: Option<Difficulty>,
    pub note: String,
}

/// Newest `limit` sessions, newest first. Missing subjects read as "Unknown".
pub fn recent_log(state: &StudyState, limit: usize) -> Vec<SessionView> {
    state
        .sessions
        .iter()
        .rev()
        .take(limit)
        .map(|s| SessionView {
            session_id: s.id.clone(),
            subject_name: state.subject_name(s.subject_id.as_deref()).to_string(),
            minutes: s.minutes,
            day: s.day,
            difficulty: s.difficulty,
            note: s.note.clone(),
        })
        .collect()
}
