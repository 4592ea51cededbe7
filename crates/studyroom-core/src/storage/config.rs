//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Timer durations, long-break cadence and auto-start behavior
//! - Daily goal and the rolling window for per-subject statistics
//! - Reminder preferences
//!
//! Configuration is stored at `~/.config/studyroom/config.toml`.
//! Ranged values are clamped on load and on every write.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::TimerSettings;

pub const POMODORO_MINUTES_RANGE: (u32, u32) = (5, 90);
pub const SHORT_BREAK_MINUTES_RANGE: (u32, u32) = (1, 30);
pub const LONG_BREAK_MINUTES_RANGE: (u32, u32) = (5, 60);
pub const CYCLES_BEFORE_LONG_BREAK_RANGE: (u32, u32) = (2, 8);
pub const DAILY_GOAL_RANGE: (u32, u32) = (1, 10);
pub const RECENT_WINDOW_DAYS_RANGE: (u32, u32) = (1, 365);

/// Timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_pomodoro_minutes")]
    pub pomodoro_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    #[serde(default = "default_cycles_before_long_break")]
    pub cycles_before_long_break: u32,
    #[serde(default = "default_true")]
    pub auto_start_break: bool,
    #[serde(default)]
    pub auto_start_next_focus: bool,
    #[serde(default = "default_true")]
    pub end_sound_enabled: bool,
}

/// Goal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalsConfig {
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub due_reminders: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyroom/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_pomodoro_minutes() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_cycles_before_long_break() -> u32 {
    4
}
fn default_daily_goal() -> u32 {
    4
}
fn default_recent_window_days() -> u32 {
    7
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pomodoro_minutes: default_pomodoro_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            cycles_before_long_break: default_cycles_before_long_break(),
            auto_start_break: true,
            auto_start_next_focus: false,
            end_sound_enabled: true,
        }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            daily_goal: default_daily_goal(),
            recent_window_days: default_recent_window_days(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            due_reminders: true,
        }
    }
}

fn clamp((lo, hi): (u32, u32), value: u32) -> u32 {
    value.clamp(lo, hi)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        // Negative input clamps to the lower bound like any other
                        // out-of-range value.
                        let n = value
                            .trim()
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.clamp(0, u32::MAX as i64).into())
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Every ranged field pulled into its valid range.
    pub fn clamped(mut self) -> Self {
        let t = &mut self.timer;
        t.pomodoro_minutes = clamp(POMODORO_MINUTES_RANGE, t.pomodoro_minutes);
        t.short_break_minutes = clamp(SHORT_BREAK_MINUTES_RANGE, t.short_break_minutes);
        t.long_break_minutes = clamp(LONG_BREAK_MINUTES_RANGE, t.long_break_minutes);
        t.cycles_before_long_break =
            clamp(CYCLES_BEFORE_LONG_BREAK_RANGE, t.cycles_before_long_break);
        let g = &mut self.goals;
        g.daily_goal = clamp(DAILY_GOAL_RANGE, g.daily_goal);
        g.recent_window_days = clamp(RECENT_WINDOW_DAYS_RANGE, g.recent_window_days);
        self
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg.clamped())
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key in memory, clamping ranged fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        *self = updated.clamped();
        Ok(())
    }

    /// Set a value and persist the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            pomodoro_minutes: self.timer.pomodoro_minutes,
            short_break_minutes: self.timer.short_break_minutes,
            long_break_minutes: self.timer.long_break_minutes,
            cycles_before_long_break: self.timer.cycles_before_long_break,
            auto_start_break: self.timer.auto_start_break,
            auto_start_next_focus: self.timer.auto_start_next_focus,
        }
    }
}
