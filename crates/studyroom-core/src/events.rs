use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Difficulty;
use crate::timer::TimerMode;

/// Every state change in the system produces an Event.
/// Front ends render them; the controller reacts to the timer's ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimeAdjusted {
        delta_secs: i64,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    /// Entered a new mode, either explicitly or after an interval.
    ModeChanged {
        mode: TimerMode,
        seconds_remaining: u64,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    /// A focus interval ran out. The timer now waits for feedback.
    FocusCompleted {
        cycle_count: u32,
        minutes: u32,
        at: DateTime<Utc>,
    },
    /// A break ran out and the timer is back on focus.
    BreakCompleted {
        finished: TimerMode,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    SessionRecorded {
        session_id: String,
        subject_id: Option<String>,
        minutes: u32,
        at: DateTime<Utc>,
    },
    FeedbackApplied {
        session_id: String,
        subject_id: Option<String>,
        difficulty: Difficulty,
        interval_days: Option<u32>,
        next_review_date: Option<NaiveDate>,
        at: DateTime<Utc>,
    },
    FeedbackDismissed {
        session_id: String,
        at: DateTime<Utc>,
    },
    SubjectAdded {
        subject_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    SubjectUpdated {
        subject_id: String,
        at: DateTime<Utc>,
    },
    SubjectRemoved {
        subject_id: String,
        sessions_removed: usize,
        at: DateTime<Utc>,
    },
    StudiedMarkChanged {
        day: NaiveDate,
        studied: bool,
        at: DateTime<Utc>,
    },
    DueReminderSent {
        day: NaiveDate,
        due_count: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        seconds_remaining: u64,
        total_secs: u64,
        running: bool,
        cycle_count: u32,
        awaiting_feedback: bool,
        at: DateTime<Utc>,
    },
}
