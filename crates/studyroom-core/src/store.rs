//! Storage and lookup over [`StudyState`].
//!
//! Sessions form an append-only log. The only mutation a session accepts is
//! the one-time difficulty backfill, and only while it is still the newest
//! entry. Removing a subject cascades to its sessions.

use chrono::NaiveDate;
use tracing::info;

use crate::error::{CoreError, Result, ValidationError};
use crate::model::{Difficulty, Session, StudyState, Subject};

pub const UNKNOWN_SUBJECT: &str = "Unknown";

impl StudyState {
    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Display name for a possibly dangling reference.
    pub fn subject_name(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.subject(id))
            .map(|s| s.name.as_str())
            .unwrap_or(UNKNOWN_SUBJECT)
    }

    pub fn add_subject(&mut self, subject: Subject) {
        info!(subject_id = %subject.id, name = %subject.name, "subject added");
        self.subjects.push(subject);
    }

    /// Replace the subject with the same id. Keeps its position.
    pub fn replace_subject(&mut self, subject: Subject) -> Result<()> {
        let slot = self
            .subjects
            .iter_mut()
            .find(|s| s.id == subject.id)
            .ok_or_else(|| CoreError::UnknownSubject(subject.id.clone()))?;
        *slot = subject;
        Ok(())
    }

    /// Remove a subject and every session that references it.
    /// Returns the removed subject and how many sessions went with it.
    pub fn remove_subject(&mut self, id: &str) -> Result<(Subject, usize)> {
        let pos = self
            .subjects
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::UnknownSubject(id.to_string()))?;
        let subject = self.subjects.remove(pos);

        let before = self.sessions.len();
        self.sessions
            .retain(|s| s.subject_id.as_deref() != Some(id));
        let removed = before - self.sessions.len();

        if self.selected_subject.as_deref() == Some(id) {
            self.selected_subject = None;
        }
        let pending_gone = self
            .pending_session
            .as_deref()
            .is_some_and(|pending| self.session(pending).is_none());
        if pending_gone {
            self.pending_session = None;
        }
        info!(subject_id = %id, sessions_removed = removed, "subject removed");
        Ok((subject, removed))
    }

    /// Subject the next completed focus interval is credited to: the selected
    /// one if it still exists, else the first subject.
    pub fn credited_subject(&self) -> Option<&Subject> {
        self.selected_subject
            .as_deref()
            .and_then(|id| self.subject(id))
            .or_else(|| self.subjects.first())
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn sessions_for<'a>(&'a self, subject_id: &'a str) -> impl Iterator<Item = &'a Session> + 'a {
        self.sessions
            .iter()
            .filter(move |s| s.subject_id.as_deref() == Some(subject_id))
    }

    pub fn append_session(&mut self, session: Session) {
        info!(
            session_id = %session.id,
            subject_id = session.subject_id.as_deref().unwrap_or("-"),
            minutes = session.minutes,
            "session recorded"
        );
        self.sessions.push(session);
    }

    /// Backfill the difficulty of the newest session. Written at most once.
    pub fn attach_difficulty(&mut self, session_id: &str, difficulty: Difficulty) -> Result<&Session> {
        let newest = self
            .sessions
            .last_mut()
            .filter(|s| s.id == session_id)
            .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
        if newest.difficulty.is_some() {
            return Err(ValidationError::InvalidValue {
                field: "difficulty".into(),
                message: format!("session {session_id} is already rated"),
            }
            .into());
        }
        newest.difficulty = Some(difficulty);
        Ok(newest)
    }

    pub fn annotate_session(&mut self, session_id: &str, note: &str) -> Result<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
        session.note = note.trim().to_string();
        Ok(())
    }

    pub fn is_marked_studied(&self, day: NaiveDate) -> bool {
        self.studied_days.contains(&day)
    }

    /// Set or clear the manual studied mark. Returns whether anything changed.
    pub fn set_studied(&mut self, day: NaiveDate, studied: bool) -> bool {
        if studied {
            self.studied_days.insert(day)
        } else {
            self.studied_days.remove(&day)
        }
    }
}
