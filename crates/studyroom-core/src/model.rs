//! Plain data records: subjects, sessions and the overall state record.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_SUBJECT_COLOR: &str = "#3b82f6";

/// Self-reported difficulty of a completed focus interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "e" | "easy" => Ok(Difficulty::Easy),
            "m" | "medium" => Ok(Difficulty::Medium),
            "h" | "hard" => Ok(Difficulty::Hard),
            other => Err(ValidationError::InvalidValue {
                field: "difficulty".into(),
                message: format!("expected easy, medium or hard, got '{other}'"),
            }),
        }
    }
}

/// A subject under study.
///
/// `interval_days >= 1` always holds; only the scheduler and explicit edits
/// change the review fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub exam_date: NaiveDate,
    /// Missing in older state; treated as "today" by readers.
    #[serde(default)]
    pub next_review_date: Option<NaiveDate>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_interval")]
    pub interval_days: u32,
    #[serde(default)]
    pub ease_streak: u32,
}

fn default_color() -> String {
    DEFAULT_SUBJECT_COLOR.into()
}

fn default_interval() -> u32 {
    1
}

impl Subject {
    /// A fresh subject: interval 1, due today.
    pub fn new(name: impl Into<String>, exam_date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            exam_date,
            next_review_date: Some(today),
            color: default_color(),
            interval_days: 1,
            ease_streak: 0,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Next review day, defaulting to `today` when unset.
    pub fn review_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.next_review_date.unwrap_or(today)
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.review_date_or(today) <= today
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Pomodoro,
}

/// One completed focus interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// `None` when no subject existed at completion time.
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub minutes: u32,
    pub completed_at: DateTime<Utc>,
    /// Local calendar day of completion, fixed when recorded.
    pub day: NaiveDate,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub note: String,
}

impl Session {
    pub fn pomodoro(
        subject_id: Option<String>,
        minutes: u32,
        completed_at: DateTime<Utc>,
        day: NaiveDate,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id,
            kind: SessionKind::Pomodoro,
            minutes,
            completed_at,
            day,
            difficulty: None,
            note: String::new(),
        }
    }
}

/// The single state record persisted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyState {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Days the user manually marked as studied.
    #[serde(default)]
    pub studied_days: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub selected_subject: Option<String>,
    /// Completed focus intervals; drives the long-break decision.
    #[serde(default)]
    pub cycle_count: u32,
    #[serde(default)]
    pub last_due_notify_day: Option<NaiveDate>,
    /// Session whose difficulty rating is still outstanding.
    #[serde(default)]
    pub pending_session: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_short_and_long_forms() {
        assert_eq!("e".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("trivial".parse::<Difficulty>().is_err());
    }

    #[test]
    fn new_subject_is_due_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        let exam = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let s = Subject::new("Chemistry", exam, today);
        assert_eq!(s.interval_days, 1);
        assert_eq!(s.ease_streak, 0);
        assert_eq!(s.next_review_date, Some(today));
        assert!(s.is_due(today));
    }

    #[test]
    fn subject_without_review_date_deserializes_as_due() {
        let json = r#"{"id":"a","name":"Math","exam_date":"2024-06-01"}"#;
        let s: Subject = serde_json::from_str(json).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        assert_eq!(s.interval_days, 1);
        assert_eq!(s.color, DEFAULT_SUBJECT_COLOR);
        assert!(s.is_due(today));
        assert_eq!(s.review_date_or(today), today);
    }

    #[test]
    fn session_serializes_type_tag() {
        let at = Utc::now();
        let s = Session::pomodoro(None, 25, at, at.date_naive());
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "pomodoro");
        assert!(json["difficulty"].is_null());
    }
}
