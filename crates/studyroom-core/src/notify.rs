//! Notification and audio collaborators.
//!
//! Front ends supply implementations. An environment without either
//! capability uses the null ones: calls become no-ops and the engine carries on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::StudyState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    Default,
}

/// Delivers user-visible notifications.
pub trait Notifier {
    /// Ask for permission to notify. Implementations without a prompt just
    /// report their current state.
    fn request_permission(&mut self) -> Permission;

    fn notify(&mut self, title: &str, body: &str);

    /// Whether notifications can exist at all in this environment.
    fn is_supported(&self) -> bool {
        true
    }
}

/// Fire-and-forget completion sound.
pub trait AudioCue {
    fn play_completion_sound(&mut self);

    fn is_supported(&self) -> bool {
        true
    }
}

/// Environment without notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn request_permission(&mut self) -> Permission {
        Permission::Denied
    }

    fn notify(&mut self, _title: &str, _body: &str) {}

    fn is_supported(&self) -> bool {
        false
    }
}

/// Environment without audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioCue for NullAudio {
    fn play_completion_sound(&mut self) {}

    fn is_supported(&self) -> bool {
        false
    }
}

/// A due reminder goes out at most once per calendar day, only with
/// permission and only when something is due.
pub fn should_remind(state: &StudyState, today: NaiveDate, permission: Permission, due_count: usize) -> bool {
    permission == Permission::Granted
        && due_count > 0
        && state.last_due_notify_day != Some(today)
}

pub fn reminder_text(due_names: &[&str]) -> (String, String) {
    let title = match due_names.len() {
        1 => "1 subject due for review".to_string(),
        n => format!("{n} subjects due for review"),
    };
    (title, due_names.join(", "))
}
