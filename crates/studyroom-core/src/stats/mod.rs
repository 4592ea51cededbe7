//! Statistics module for Studyroom
//!
//! Pure reads over subjects, sessions, manual studied marks and the current
//! day: due list, goal progress, streak, per-subject statistics, activity
//! buckets and achievements.

mod achievements;
mod activity;
mod subjects;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::StudyState;

pub use achievements::{achievements, Achievement, Counters};
pub use activity::{
    activity_on, range_activity, streak, today_progress, ActivityRange, DayActivity, GoalProgress,
};
pub use subjects::{
    due_today, recent_log, subject_stats, SessionView, SubjectStats, DEFAULT_RECENT_WINDOW_DAYS,
};

/// Entry of the due list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueEntry {
    pub subject_id: String,
    pub name: String,
    pub next_review_date: NaiveDate,
    pub interval_days: u32,
}

/// Dashboard snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub today: NaiveDate,
    pub due: Vec<DueEntry>,
    pub progress: GoalProgress,
    pub streak: u32,
    pub total_sessions: u32,
    pub subjects: Vec<SubjectStats>,
    pub achievements: Vec<Achievement>,
}

pub fn overview(state: &StudyState, today: NaiveDate, daily_goal: u32, window_days: u32) -> Overview {
    let due = due_today(state, today)
        .into_iter()
        .map(|s| DueEntry {
            subject_id: s.id.clone(),
            name: s.name.clone(),
            next_review_date: s.review_date_or(today),
            interval_days: s.interval_days,
        })
        .collect();
    let counters = Counters::collect(state, today);
    Overview {
        today,
        due,
        progress: today_progress(state, today, daily_goal),
        streak: counters.streak,
        total_sessions: counters.total_sessions,
        subjects: subject_stats(state, today, window_days),
        achievements: achievements(&counters),
    }
}
