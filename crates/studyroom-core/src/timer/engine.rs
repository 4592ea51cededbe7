//! Timer engine implementation.
//!
//! A countdown state machine over three modes with an orthogonal `running`
//! flag. It owns no thread: the caller delivers one `tick()` per second, or
//! calls `sync_to(now)` to catch up on wall-clock time in one go.
//!
//! ## State Transitions
//!
//! ```text
//! pomodoro --(runs out)--> [awaiting feedback] --(resolve)--> short | long
//! short | long --(runs out)--> pomodoro
//! ```
//!
//! While feedback is pending no tick is delivered and no new interval can be
//! started, reset, skipped or switched.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::mode::{select_break, TimerMode, TimerSettings};
use crate::events::Event;

/// Core timer engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerEngine {
    settings: TimerSettings,
    mode: TimerMode,
    seconds_remaining: u64,
    running: bool,
    cycle_count: u32,
    awaiting_feedback: bool,
    /// Wall-clock instant up to which elapsed time has been applied.
    #[serde(default)]
    last_tick_at: Option<DateTime<Utc>>,
}

impl TimerEngine {
    /// Paused on a full focus interval, zero cycles.
    pub fn new(settings: TimerSettings) -> Self {
        Self::restore(settings, 0)
    }

    /// Fresh engine carrying a persisted cycle count.
    pub fn restore(settings: TimerSettings, cycle_count: u32) -> Self {
        let seconds_remaining = settings.duration_secs(TimerMode::Pomodoro);
        Self {
            settings,
            mode: TimerMode::Pomodoro,
            seconds_remaining,
            running: false,
            cycle_count,
            awaiting_feedback: false,
            last_tick_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn is_awaiting_feedback(&self) -> bool {
        self.awaiting_feedback
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn total_secs(&self) -> u64 {
        self.settings.duration_secs(self.mode)
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.seconds_remaining as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self, at: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            total_secs: self.total_secs(),
            running: self.running,
            cycle_count: self.cycle_count,
            awaiting_feedback: self.awaiting_feedback,
            at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if self.awaiting_feedback || self.running {
            return None;
        }
        self.running = true;
        self.last_tick_at = Some(at);
        Some(Event::TimerStarted {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            at,
        })
    }

    pub fn pause(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        self.last_tick_at = None;
        Some(Event::TimerPaused {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            at,
        })
    }

    /// Start/pause button.
    pub fn toggle(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if self.running {
            self.pause(at)
        } else {
            self.start(at)
        }
    }

    /// One second elapsed. Returns the completion event when the interval ends.
    pub fn tick(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if !self.running || self.awaiting_feedback {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        self.last_tick_at = Some(at);
        if self.seconds_remaining == 0 {
            return Some(self.complete(at));
        }
        None
    }

    /// Apply the whole seconds elapsed since the last tick, stopping at the
    /// first completion. Leftover time after a completion is kept for the
    /// next call when the following interval auto-started.
    pub fn sync_to(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.running || self.awaiting_feedback {
            return None;
        }
        let last = match self.last_tick_at {
            Some(last) => last,
            None => {
                self.last_tick_at = Some(now);
                return None;
            }
        };
        let elapsed = (now - last).num_seconds().max(0);
        for i in 1..=elapsed {
            if let Some(event) = self.tick(last + Duration::seconds(i)) {
                return Some(event);
            }
        }
        None
    }

    /// Switch to `mode`, stopped at its full configured duration.
    pub fn set_mode(&mut self, mode: TimerMode, at: DateTime<Utc>) -> Option<Event> {
        if self.awaiting_feedback {
            return None;
        }
        Some(self.enter(mode, false, at))
    }

    /// Stop and restore the current mode's full duration.
    pub fn reset(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if self.awaiting_feedback {
            return None;
        }
        self.running = false;
        self.last_tick_at = None;
        self.seconds_remaining = self.total_secs();
        Some(Event::TimerReset {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            at,
        })
    }

    /// Finish the current interval right now, as if it ran out.
    pub fn skip(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if self.awaiting_feedback {
            return None;
        }
        self.running = false;
        self.seconds_remaining = 0;
        Some(self.complete(at))
    }

    /// Add (or remove, when negative) whole minutes. Floors at zero.
    pub fn add_time(&mut self, minutes: i64, at: DateTime<Utc>) -> Option<Event> {
        if self.awaiting_feedback {
            return None;
        }
        let delta_secs = minutes.saturating_mul(60);
        let remaining = (self.seconds_remaining as i64).saturating_add(delta_secs);
        self.seconds_remaining = remaining.max(0) as u64;
        Some(Event::TimeAdjusted {
            delta_secs,
            seconds_remaining: self.seconds_remaining,
            at,
        })
    }

    /// Close the feedback gate and enter the break the cycle count calls for.
    pub fn resolve_feedback(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if !self.awaiting_feedback {
            return None;
        }
        self.awaiting_feedback = false;
        let next = select_break(self.cycle_count, self.settings.cycles_before_long_break);
        let auto_start = self.settings.auto_start_break;
        Some(self.enter(next, auto_start, at))
    }

    /// New durations apply on the next mode entry; a countdown in progress
    /// keeps its remaining time.
    pub fn apply_settings(&mut self, settings: TimerSettings) {
        self.settings = settings;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, mode: TimerMode, auto_start: bool, at: DateTime<Utc>) -> Event {
        self.mode = mode;
        self.seconds_remaining = self.settings.duration_secs(mode);
        self.running = auto_start;
        self.last_tick_at = auto_start.then_some(at);
        debug!(?mode, auto_start, "timer entered mode");
        Event::ModeChanged {
            mode,
            seconds_remaining: self.seconds_remaining,
            auto_started: auto_start,
            at,
        }
    }

    fn complete(&mut self, at: DateTime<Utc>) -> Event {
        self.running = false;
        self.last_tick_at = None;
        match self.mode {
            TimerMode::Pomodoro => {
                self.cycle_count = self.cycle_count.saturating_add(1);
                self.awaiting_feedback = true;
                debug!(cycle_count = self.cycle_count, "focus interval completed");
                Event::FocusCompleted {
                    cycle_count: self.cycle_count,
                    minutes: self.settings.pomodoro_minutes,
                    at,
                }
            }
            finished @ (TimerMode::Short | TimerMode::Long) => {
                let auto_start = self.settings.auto_start_next_focus;
                self.enter(TimerMode::Pomodoro, auto_start, at);
                debug!(?finished, "break completed");
                Event::BreakCompleted {
                    finished,
                    auto_started: auto_start,
                    at,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-08T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn short_settings() -> TimerSettings {
        TimerSettings {
            pomodoro_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 2,
            ..TimerSettings::default()
        }
    }

    fn run_out(engine: &mut TimerEngine) -> Event {
        let mut at = t0();
        loop {
            at += Duration::seconds(1);
            if let Some(ev) = engine.tick(at) {
                return ev;
            }
        }
    }

    #[test]
    fn start_pause_toggle() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        assert!(!engine.is_running());
        assert!(engine.toggle(t0()).is_some());
        assert!(engine.is_running());
        assert!(engine.start(t0()).is_none());
        assert!(engine.toggle(t0()).is_some());
        assert!(!engine.is_running());
        assert_eq!(engine.mode(), TimerMode::Pomodoro);
    }

    #[test]
    fn tick_does_nothing_while_paused() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        assert!(engine.tick(t0()).is_none());
        assert_eq!(engine.seconds_remaining(), 25 * 60);
    }

    #[test]
    fn focus_completion_opens_feedback_gate() {
        let mut engine = TimerEngine::new(short_settings());
        engine.start(t0());
        let ev = run_out(&mut engine);
        assert!(matches!(ev, Event::FocusCompleted { cycle_count: 1, minutes: 1, .. }));
        assert!(engine.is_awaiting_feedback());
        assert!(!engine.is_running());

        assert!(engine.start(t0()).is_none());
        assert!(engine.set_mode(TimerMode::Short, t0()).is_none());
        assert!(engine.skip(t0()).is_none());
        assert!(engine.reset(t0()).is_none());
        assert!(engine.tick(t0()).is_none());
    }

    #[test]
    fn resolve_feedback_leaves_break_paused_without_auto_start() {
        let settings = TimerSettings {
            auto_start_break: false,
            ..TimerSettings::default()
        };
        let mut engine = TimerEngine::new(settings);
        engine.skip(t0());
        let ev = engine.resolve_feedback(t0()).unwrap();
        assert!(matches!(
            ev,
            Event::ModeChanged { mode: TimerMode::Short, auto_started: false, .. }
        ));
        assert_eq!(engine.mode(), TimerMode::Short);
        assert!(!engine.is_running());
        assert_eq!(engine.seconds_remaining(), 5 * 60);

        // Paused means no catch-up either.
        assert!(engine.sync_to(t0() + Duration::seconds(600)).is_none());
        assert_eq!(engine.seconds_remaining(), 5 * 60);
    }

    #[test]
    fn resolve_feedback_enters_short_break_and_auto_starts() {
        let mut engine = TimerEngine::new(short_settings());
        engine.skip(t0());
        let ev = engine.resolve_feedback(t0()).unwrap();
        assert!(matches!(
            ev,
            Event::ModeChanged { mode: TimerMode::Short, auto_started: true, .. }
        ));
        assert!(engine.is_running());
        assert_eq!(engine.seconds_remaining(), 60);
        assert!(engine.resolve_feedback(t0()).is_none());
    }

    #[test]
    fn break_completion_returns_to_paused_focus() {
        let mut engine = TimerEngine::new(short_settings());
        engine.set_mode(TimerMode::Short, t0());
        engine.start(t0());
        let ev = run_out(&mut engine);
        assert!(matches!(
            ev,
            Event::BreakCompleted { finished: TimerMode::Short, auto_started: false, .. }
        ));
        assert_eq!(engine.mode(), TimerMode::Pomodoro);
        assert!(!engine.is_running());
        assert_eq!(engine.seconds_remaining(), 60);
        assert_eq!(engine.cycle_count(), 0);
    }

    #[test]
    fn break_completion_auto_starts_focus_when_enabled() {
        let mut settings = short_settings();
        settings.auto_start_next_focus = true;
        let mut engine = TimerEngine::new(settings);
        engine.set_mode(TimerMode::Long, t0());
        engine.skip(t0());
        assert_eq!(engine.mode(), TimerMode::Pomodoro);
        assert!(engine.is_running());
        assert!(!engine.is_awaiting_feedback());
    }

    #[test]
    fn fourth_cycle_takes_long_break() {
        let mut engine = TimerEngine::new(short_settings());
        let mut breaks = Vec::new();
        for _ in 0..4 {
            engine.set_mode(TimerMode::Pomodoro, t0());
            engine.skip(t0());
            engine.resolve_feedback(t0());
            breaks.push(engine.mode());
        }
        assert_eq!(
            breaks,
            vec![TimerMode::Short, TimerMode::Short, TimerMode::Short, TimerMode::Long]
        );
    }

    #[test]
    fn add_time_floors_at_zero() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        engine.add_time(5, t0());
        assert_eq!(engine.seconds_remaining(), 30 * 60);
        engine.add_time(-100, t0());
        assert_eq!(engine.seconds_remaining(), 0);
        assert_eq!(engine.mode(), TimerMode::Pomodoro);
        assert!(!engine.is_running());
    }

    #[test]
    fn reset_restores_full_duration() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        engine.start(t0());
        engine.tick(t0() + Duration::seconds(1));
        engine.reset(t0());
        assert_eq!(engine.seconds_remaining(), 25 * 60);
        assert!(!engine.is_running());
    }

    #[test]
    fn settings_change_waits_for_next_mode_entry() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        engine.add_time(-5, t0());
        engine.apply_settings(TimerSettings {
            pomodoro_minutes: 50,
            ..TimerSettings::default()
        });
        assert_eq!(engine.seconds_remaining(), 20 * 60);
        engine.reset(t0());
        assert_eq!(engine.seconds_remaining(), 50 * 60);
    }

    #[test]
    fn sync_to_catches_up_and_stops_at_completion() {
        let mut engine = TimerEngine::new(short_settings());
        engine.start(t0());
        assert!(engine.sync_to(t0() + Duration::seconds(30)).is_none());
        assert_eq!(engine.seconds_remaining(), 30);

        let ev = engine.sync_to(t0() + Duration::seconds(500));
        assert!(matches!(ev, Some(Event::FocusCompleted { .. })));
        assert_eq!(engine.seconds_remaining(), 0);
        assert_eq!(engine.cycle_count(), 1);
    }

    #[test]
    fn restore_keeps_cycle_count() {
        let engine = TimerEngine::restore(TimerSettings::default(), 7);
        assert_eq!(engine.cycle_count(), 7);
        assert_eq!(engine.mode(), TimerMode::Pomodoro);
        assert!(!engine.is_awaiting_feedback());
    }
}
