//! Achievements derived from aggregate counters.
//!
//! Nothing here is persisted: unlock state is recomputed from the current
//! data every time, so deleting sessions can lock an achievement again.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::activity::streak;
use super::subjects::due_today;
use crate::model::StudyState;

/// Snapshot of the counters the predicates look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub subjects: u32,
    pub total_sessions: u32,
    pub streak: u32,
    pub due_today: u32,
}

impl Counters {
    pub fn collect(state: &StudyState, today: NaiveDate) -> Self {
        Self {
            subjects: state.subjects.len() as u32,
            total_sessions: state.sessions.len() as u32,
            streak: streak(state, today),
            due_today: due_today(state, today).len() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Subjects(u32),
    Sessions(u32),
    Streak(u32),
    CaughtUp,
}

struct Definition {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    rule: Rule,
}

const DEFINITIONS: &[Definition] = &[
    Definition {
        id: "first_subject",
        title: "Getting Started",
        description: "Add your first subject",
        rule: Rule::Subjects(1),
    },
    Definition {
        id: "first_session",
        title: "First Focus",
        description: "Complete a focus session",
        rule: Rule::Sessions(1),
    },
    Definition {
        id: "three_sessions",
        title: "Warming Up",
        description: "Complete 3 focus sessions",
        rule: Rule::Sessions(3),
    },
    Definition {
        id: "ten_sessions",
        title: "Dedicated",
        description: "Complete 10 focus sessions",
        rule: Rule::Sessions(10),
    },
    Definition {
        id: "streak_3",
        title: "On a Roll",
        description: "Study 3 days in a row",
        rule: Rule::Streak(3),
    },
    Definition {
        id: "streak_7",
        title: "Week Warrior",
        description: "Study 7 days in a row",
        rule: Rule::Streak(7),
    },
    Definition {
        id: "caught_up",
        title: "All Caught Up",
        description: "Have no reviews due today",
        rule: Rule::CaughtUp,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 0.0 .. 1.0
    pub progress: f64,
    pub unlocked: bool,
}

fn ratio(current: u32, target: u32) -> f64 {
    if target == 0 {
        return 1.0;
    }
    (current as f64 / target as f64).min(1.0)
}

fn evaluate(rule: Rule, c: &Counters) -> (f64, bool) {
    match rule {
        Rule::Subjects(n) => (ratio(c.subjects, n), c.subjects >= n),
        Rule::Sessions(n) => (ratio(c.total_sessions, n), c.total_sessions >= n),
        Rule::Streak(n) => (ratio(c.streak, n), c.streak >= n),
        Rule::CaughtUp => {
            if c.subjects == 0 {
                (0.0, false)
            } else {
                let clear = c.subjects.saturating_sub(c.due_today);
                (ratio(clear, c.subjects), c.due_today == 0)
            }
        }
    }
}

/// Every achievement with its current progress, in a fixed order.
pub fn achievements(counters: &Counters) -> Vec<Achievement> {
    DEFINITIONS
        .iter()
        .map(|d| {
            let (progress, unlocked) = evaluate(d.rule, counters);
            Achievement {
                id: d.id.to_string(),
                title: d.title.to_string(),
                description: d.description.to_string(),
                progress,
                unlocked,
            }
        })
        .collect()
}
