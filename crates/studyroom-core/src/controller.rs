//! Single owner of the study state.
//!
//! Every read and write of subjects, sessions, manual marks and the timer
//! goes through [`StudyController`]. After each mutation the whole state is
//! handed to the [`StateStore`].
//!
//! A completed focus interval is processed in one step: the session is
//! recorded and the timer closes its feedback gate. Nothing else can start
//! until [`StudyController::rate`] or [`StudyController::dismiss_feedback`]
//! resolves it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{CoreError, Result, TimerError, ValidationError};
use crate::events::Event;
use crate::model::{Difficulty, Session, StudyState, Subject};
use crate::notify::{reminder_text, should_remind, AudioCue, Notifier, NullAudio, NullNotifier};
use crate::scheduler::apply_feedback;
use crate::stats::{self, ActivityRange, DayActivity, GoalProgress, Overview, SubjectStats};
use crate::storage::{Config, StateStore};
use crate::timer::{TimerEngine, TimerMode};

/// Fields of an explicit subject edit. `None` leaves a field unchanged.
///
/// Setting `next_review_date` or `interval_days` bypasses the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEdit {
    pub name: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub color: Option<String>,
    pub next_review_date: Option<NaiveDate>,
    pub interval_days: Option<u32>,
}

pub struct StudyController<S: StateStore, C: Clock> {
    store: S,
    clock: C,
    config: Config,
    state: StudyState,
    timer: TimerEngine,
    notifier: Box<dyn Notifier>,
    audio: Box<dyn AudioCue>,
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyField("name".into()).into());
    }
    Ok(name.to_string())
}

impl<S: StateStore, C: Clock> StudyController<S, C> {
    /// Load the state from `store` and set the timer up from `config`.
    pub fn new(store: S, clock: C, config: Config) -> Self {
        let config = config.clamped();
        let state = store.load();
        let timer = TimerEngine::restore(config.timer_settings(), state.cycle_count);
        Self {
            store,
            clock,
            config,
            state,
            timer,
            notifier: Box::new(NullNotifier),
            audio: Box::new(NullAudio),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioCue>) -> Self {
        self.audio = audio;
        self
    }

    /// Resume a previously saved timer. Current configuration wins over the
    /// snapshot's durations for the next mode entry.
    ///
    /// A rating still owed goes to the stored pending session and nowhere
    /// else; when that session is gone the gate resolves without rescheduling.
    pub fn restore_timer(&mut self, mut timer: TimerEngine) {
        timer.apply_settings(self.config.timer_settings());
        if !timer.is_awaiting_feedback() && self.state.pending_session.is_some() {
            debug!("saved timer is not awaiting feedback, dropping pending session");
            self.state.pending_session = None;
        }
        self.timer = timer;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &StudyState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn pending_session(&self) -> Option<&Session> {
        self.state
            .pending_session
            .as_deref()
            .and_then(|id| self.state.session(id))
    }

    pub fn snapshot(&self) -> Event {
        self.timer.snapshot(self.clock.now())
    }

    pub fn due_today(&self) -> Vec<&Subject> {
        stats::due_today(&self.state, self.today())
    }

    pub fn today_progress(&self) -> GoalProgress {
        stats::today_progress(&self.state, self.today(), self.config.goals.daily_goal)
    }

    pub fn streak(&self) -> u32 {
        stats::streak(&self.state, self.today())
    }

    pub fn subject_stats(&self) -> Vec<SubjectStats> {
        stats::subject_stats(&self.state, self.today(), self.config.goals.recent_window_days)
    }

    pub fn activity(&self, range: ActivityRange) -> Vec<DayActivity> {
        stats::range_activity(&self.state, self.today(), range)
    }

    pub fn overview(&self) -> Overview {
        stats::overview(
            &self.state,
            self.today(),
            self.config.goals.daily_goal,
            self.config.goals.recent_window_days,
        )
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Takes effect on the next mode entry; a running countdown is untouched.
    pub fn set_config(&mut self, config: Config) {
        self.config = config.clamped();
        self.timer.apply_settings(self.config.timer_settings());
    }

    // ── Subjects ─────────────────────────────────────────────────────

    pub fn add_subject(
        &mut self,
        name: &str,
        exam_date: NaiveDate,
        color: Option<&str>,
    ) -> Result<Event> {
        let name = validate_name(name)?;
        let mut subject = Subject::new(name, exam_date, self.today());
        if let Some(color) = color {
            subject = subject.with_color(color);
        }
        let event = Event::SubjectAdded {
            subject_id: subject.id.clone(),
            name: subject.name.clone(),
            at: self.clock.now(),
        };
        self.state.add_subject(subject);
        self.persist()?;
        Ok(event)
    }

    pub fn edit_subject(&mut self, id: &str, edit: SubjectEdit) -> Result<Event> {
        let mut subject = self
            .state
            .subject(id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownSubject(id.to_string()))?;
        if let Some(name) = edit.name {
            subject.name = validate_name(&name)?;
        }
        if let Some(exam_date) = edit.exam_date {
            subject.exam_date = exam_date;
        }
        if let Some(color) = edit.color {
            subject.color = color;
        }
        if let Some(next_review_date) = edit.next_review_date {
            subject.next_review_date = Some(next_review_date);
        }
        if let Some(interval_days) = edit.interval_days {
            subject.interval_days = interval_days.max(1);
        }
        self.state.replace_subject(subject)?;
        self.persist()?;
        Ok(Event::SubjectUpdated {
            subject_id: id.to_string(),
            at: self.clock.now(),
        })
    }

    /// Remove a subject together with its sessions.
    pub fn remove_subject(&mut self, id: &str) -> Result<Event> {
        let (_, sessions_removed) = self.state.remove_subject(id)?;
        self.persist()?;
        Ok(Event::SubjectRemoved {
            subject_id: id.to_string(),
            sessions_removed,
            at: self.clock.now(),
        })
    }

    /// Subject credited by the next completed focus interval.
    pub fn select_subject(&mut self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            if self.state.subject(id).is_none() {
                return Err(CoreError::UnknownSubject(id.to_string()));
            }
        }
        self.state.selected_subject = id.map(str::to_string);
        self.persist()
    }

    // ── Manual marks and notes ───────────────────────────────────────

    pub fn set_studied(&mut self, day: NaiveDate, studied: bool) -> Result<Option<Event>> {
        if !self.state.set_studied(day, studied) {
            return Ok(None);
        }
        self.persist()?;
        Ok(Some(Event::StudiedMarkChanged {
            day,
            studied,
            at: self.clock.now(),
        }))
    }

    pub fn toggle_studied_today(&mut self) -> Result<Event> {
        let today = self.today();
        let studied = !self.state.is_marked_studied(today);
        self.state.set_studied(today, studied);
        self.persist()?;
        Ok(Event::StudiedMarkChanged {
            day: today,
            studied,
            at: self.clock.now(),
        })
    }

    pub fn annotate_session(&mut self, session_id: &str, note: &str) -> Result<()> {
        self.state.annotate_session(session_id, note)?;
        self.persist()
    }

    // ── Timer ────────────────────────────────────────────────────────

    fn ensure_not_gated(&self) -> Result<()> {
        if self.timer.is_awaiting_feedback() {
            return Err(TimerError::AwaitingFeedback.into());
        }
        Ok(())
    }

    pub fn start(&mut self) -> Result<Vec<Event>> {
        self.ensure_not_gated()?;
        let at = self.clock.now();
        let event = self.timer.start(at);
        self.after_timer(event)
    }

    pub fn pause(&mut self) -> Result<Vec<Event>> {
        let at = self.clock.now();
        let event = self.timer.pause(at);
        self.after_timer(event)
    }

    pub fn toggle(&mut self) -> Result<Vec<Event>> {
        if !self.timer.is_running() {
            self.ensure_not_gated()?;
        }
        let at = self.clock.now();
        let event = self.timer.toggle(at);
        self.after_timer(event)
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Result<Vec<Event>> {
        self.ensure_not_gated()?;
        let at = self.clock.now();
        let event = self.timer.set_mode(mode, at);
        self.after_timer(event)
    }

    pub fn reset(&mut self) -> Result<Vec<Event>> {
        self.ensure_not_gated()?;
        let at = self.clock.now();
        let event = self.timer.reset(at);
        self.after_timer(event)
    }

    pub fn skip(&mut self) -> Result<Vec<Event>> {
        self.ensure_not_gated()?;
        let at = self.clock.now();
        let event = self.timer.skip(at);
        self.after_timer(event)
    }

    pub fn add_time(&mut self, minutes: i64) -> Result<Vec<Event>> {
        self.ensure_not_gated()?;
        let at = self.clock.now();
        let event = self.timer.add_time(minutes, at);
        self.after_timer(event)
    }

    /// One second of a running timer.
    pub fn tick(&mut self) -> Result<Vec<Event>> {
        let at = self.clock.now();
        let event = self.timer.tick(at);
        self.after_timer(event)
    }

    /// Catch up on wall-clock time since the last tick.
    pub fn sync(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now();
        let event = self.timer.sync_to(now);
        self.after_timer(event)
    }

    /// Rate the pending session, reschedule its subject, then start the break.
    pub fn rate(&mut self, difficulty: Difficulty) -> Result<Vec<Event>> {
        if !self.timer.is_awaiting_feedback() {
            return Err(TimerError::NoPendingFeedback.into());
        }
        let at = self.clock.now();
        let today = self.today();
        let mut events = Vec::new();

        let pending = self
            .state
            .pending_session
            .clone()
            .filter(|id| self.state.session(id).is_some());
        if let Some(session_id) = pending {
            let session = self.state.attach_difficulty(&session_id, difficulty)?;
            let subject_id = session.subject_id.clone();
            let rescheduled = subject_id
                .as_deref()
                .and_then(|id| self.state.subject(id))
                .map(|subject| apply_feedback(subject, difficulty, today));

            let (interval_days, next_review_date) = match rescheduled {
                Some(subject) => {
                    let fields = (Some(subject.interval_days), subject.next_review_date);
                    info!(
                        subject_id = %subject.id,
                        %difficulty,
                        interval_days = subject.interval_days,
                        "subject rescheduled"
                    );
                    self.state.replace_subject(subject)?;
                    fields
                }
                None => {
                    warn!(%session_id, "rated session has no subject, nothing rescheduled");
                    (None, None)
                }
            };
            events.push(Event::FeedbackApplied {
                session_id,
                subject_id,
                difficulty,
                interval_days,
                next_review_date,
                at,
            });
        }

        self.state.pending_session = None;
        events.extend(self.timer.resolve_feedback(at));
        self.persist()?;
        Ok(events)
    }

    /// Close the feedback gate without rating. Nothing is rescheduled.
    pub fn dismiss_feedback(&mut self) -> Result<Vec<Event>> {
        if !self.timer.is_awaiting_feedback() {
            return Err(TimerError::NoPendingFeedback.into());
        }
        let at = self.clock.now();
        let mut events = Vec::new();
        if let Some(session_id) = self.state.pending_session.take() {
            events.push(Event::FeedbackDismissed { session_id, at });
        }
        events.extend(self.timer.resolve_feedback(at));
        self.persist()?;
        Ok(events)
    }

    fn after_timer(&mut self, event: Option<Event>) -> Result<Vec<Event>> {
        let Some(event) = event else {
            return Ok(Vec::new());
        };
        let focus = match &event {
            Event::FocusCompleted { minutes, at, .. } => Some((*minutes, *at)),
            _ => None,
        };
        let interval_done = matches!(
            event,
            Event::FocusCompleted { .. } | Event::BreakCompleted { .. }
        );

        let mut events = vec![event];
        if let Some((minutes, at)) = focus {
            events.push(self.record_focus(minutes, at)?);
        }
        if interval_done {
            self.completion_sound();
        }
        Ok(events)
    }

    fn record_focus(&mut self, minutes: u32, at: DateTime<Utc>) -> Result<Event> {
        let subject_id = self.state.credited_subject().map(|s| s.id.clone());
        let day = self.clock.day_of(at);
        let session = Session::pomodoro(subject_id.clone(), minutes, at, day);
        let session_id = session.id.clone();
        self.state.append_session(session);
        self.state.cycle_count = self.timer.cycle_count();
        self.state.pending_session = Some(session_id.clone());
        self.persist()?;
        Ok(Event::SessionRecorded {
            session_id,
            subject_id,
            minutes,
            at,
        })
    }

    fn completion_sound(&mut self) {
        if !self.config.timer.end_sound_enabled {
            return;
        }
        if self.audio.is_supported() {
            self.audio.play_completion_sound();
        } else {
            debug!("audio unavailable, completion sound skipped");
        }
    }

    // ── Reminders ────────────────────────────────────────────────────

    /// Notify about due subjects, at most once per calendar day.
    pub fn remind_due(&mut self) -> Result<Option<Event>> {
        if !self.config.notifications.due_reminders {
            return Ok(None);
        }
        if !self.notifier.is_supported() {
            debug!("notifications unavailable, due reminder skipped");
            return Ok(None);
        }
        let today = self.today();
        let due: Vec<String> = stats::due_today(&self.state, today)
            .iter()
            .map(|s| s.name.clone())
            .collect();
        if due.is_empty() || self.state.last_due_notify_day == Some(today) {
            return Ok(None);
        }
        let permission = self.notifier.request_permission();
        if !should_remind(&self.state, today, permission, due.len()) {
            debug!(?permission, "due reminder not sent");
            return Ok(None);
        }
        let names: Vec<&str> = due.iter().map(String::as_str).collect();
        let (title, body) = reminder_text(&names);
        self.notifier.notify(&title, &body);
        self.state.last_due_notify_day = Some(today);
        self.persist()?;
        Ok(Some(Event::DueReminderSent {
            day: today,
            due_count: due.len(),
            at: self.clock.now(),
        }))
    }

    // ── Backup ───────────────────────────────────────────────────────

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }

    /// Replace the whole state with an exported document.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let state: StudyState = serde_json::from_str(json)?;
        info!(
            subjects = state.subjects.len(),
            sessions = state.sessions.len(),
            "state imported"
        );
        self.timer = TimerEngine::restore(self.config.timer_settings(), state.cycle_count);
        self.state = StudyState {
            pending_session: None,
            ..state
        };
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.state)
    }
}
