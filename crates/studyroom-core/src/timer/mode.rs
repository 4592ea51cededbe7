use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Pomodoro,
    Short,
    Long,
}

impl TimerMode {
    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Pomodoro)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "Focus",
            TimerMode::Short => "Short Break",
            TimerMode::Long => "Long Break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pomodoro" | "focus" => Ok(TimerMode::Pomodoro),
            "short" | "short-break" => Ok(TimerMode::Short),
            "long" | "long-break" => Ok(TimerMode::Long),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("expected pomodoro, short or long, got '{other}'"),
            }),
        }
    }
}

/// The timer-facing slice of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub pomodoro_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub cycles_before_long_break: u32,
    pub auto_start_break: bool,
    pub auto_start_next_focus: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            pomodoro_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            cycles_before_long_break: 4,
            auto_start_break: true,
            auto_start_next_focus: false,
        }
    }
}

impl TimerSettings {
    pub fn minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Pomodoro => self.pomodoro_minutes,
            TimerMode::Short => self.short_break_minutes,
            TimerMode::Long => self.long_break_minutes,
        }
    }

    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        (self.minutes(mode) as u64).saturating_mul(60)
    }
}

/// Break that follows the `cycle_count`-th completed focus interval.
pub fn select_break(cycle_count: u32, cycles_before_long_break: u32) -> TimerMode {
    if cycle_count > 0
        && cycles_before_long_break > 0
        && cycle_count % cycles_before_long_break == 0
    {
        TimerMode::Long
    } else {
        TimerMode::Short
    }
}
