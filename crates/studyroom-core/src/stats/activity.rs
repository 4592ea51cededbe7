//! Daily activity: streak, goal progress and range buckets.
//!
//! A day counts as active when it has at least one session or a manual
//! studied mark. Both contribute identically to every figure here.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{add_days, window_ending};
use crate::model::StudyState;

/// Activity count for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub day: NaiveDate,
    pub sessions: u32,
    pub marked_studied: bool,
    /// `sessions` plus one for a manual mark.
    pub count: u32,
}

/// Window length for activity charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityRange {
    Week,
    Month,
}

impl ActivityRange {
    pub fn days(&self) -> u32 {
        match self {
            ActivityRange::Week => 7,
            ActivityRange::Month => 30,
        }
    }
}

/// Progress toward the daily session goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Uncapped; may exceed the goal.
    pub completed: u32,
    pub goal: u32,
    /// `completed` capped at `goal`, for display.
    pub shown: u32,
    /// 0.0 .. 1.0
    pub fraction: f64,
    pub reached: bool,
}

fn sessions_per_day(state: &StudyState) -> HashMap<NaiveDate, u32> {
    let mut counts = HashMap::new();
    for session in &state.sessions {
        *counts.entry(session.day).or_insert(0) += 1;
    }
    counts
}

fn day_activity(state: &StudyState, counts: &HashMap<NaiveDate, u32>, day: NaiveDate) -> DayActivity {
    let sessions = counts.get(&day).copied().unwrap_or(0);
    let marked_studied = state.is_marked_studied(day);
    DayActivity {
        day,
        sessions,
        marked_studied,
        count: sessions + u32::from(marked_studied),
    }
}

pub fn activity_on(state: &StudyState, day: NaiveDate) -> DayActivity {
    day_activity(state, &sessions_per_day(state), day)
}

/// Sessions completed today plus one for a manual mark, against `daily_goal`.
pub fn today_progress(state: &StudyState, today: NaiveDate, daily_goal: u32) -> GoalProgress {
    let completed = activity_on(state, today).count;
    let goal = daily_goal.max(1);
    GoalProgress {
        completed,
        goal,
        shown: completed.min(goal),
        fraction: (completed as f64 / goal as f64).min(1.0),
        reached: completed >= goal,
    }
}

/// Consecutive active days ending today. Zero when today itself is inactive.
pub fn streak(state: &StudyState, today: NaiveDate) -> u32 {
    let counts = sessions_per_day(state);
    let mut day = today;
    let mut streak = 0;
    while day_activity(state, &counts, day).count > 0 {
        streak += 1;
        let prev = add_days(day, -1);
        if prev == day {
            break;
        }
        day = prev;
    }
    streak
}

/// Per-day activity for the window ending today, oldest first.
pub fn range_activity(state: &StudyState, today: NaiveDate, range: ActivityRange) -> Vec<DayActivity> {
    let counts = sessions_per_day(state);
    window_ending(today, range.days())
        .into_iter()
        .map(|day| day_activity(state, &counts, day))
        .collect()
}
