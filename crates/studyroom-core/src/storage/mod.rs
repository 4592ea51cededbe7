mod config;
pub mod database;

pub use config::{Config, GoalsConfig, NotificationsConfig, TimerConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::model::StudyState;

/// Persistence collaborator. Every save is a full-state overwrite.
pub trait StateStore {
    /// Stored state, or the default state when nothing usable is stored.
    fn load(&self) -> StudyState;

    fn save(&mut self, state: &StudyState) -> Result<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Option<StudyState>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StudyState) -> Self {
        Self {
            state: Some(state),
            saves: 0,
        }
    }

    /// Number of saves so far.
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn stored(&self) -> Option<&StudyState> {
        self.state.as_ref()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> StudyState {
        self.state.clone().unwrap_or_default()
    }

    fn save(&mut self, state: &StudyState) -> Result<()> {
        self.state = Some(state.clone());
        self.saves += 1;
        Ok(())
    }
}

/// Returns `~/.config/studyroom[-dev]/` based on STUDYROOM_ENV.
///
/// `STUDYROOM_DATA_DIR` replaces the whole path when set.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("STUDYROOM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyroom-dev")
            } else {
                base_dir.join("studyroom")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::NoDataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
