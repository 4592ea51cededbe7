//! Core error types for studyroom-core.
//!
//! The scheduler and aggregation functions are total and never return these;
//! errors come from persistence, configuration, input validation and the
//! timer's feedback gate.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Timer gate errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// A subject id that is not in the store
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    /// A session id that is not in the store
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// No usable data directory
    #[error("Cannot determine data directory: {0}")]
    NoDataDir(String),
}

/// Validation errors raised at the input boundary.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank
    #[error("'{0}' must not be empty")]
    EmptyField(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Timer gate errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimerError {
    /// A focus interval finished and its feedback has not been resolved yet
    #[error("a completed focus session is awaiting difficulty feedback")]
    AwaitingFeedback,

    /// Feedback was supplied while nothing was pending
    #[error("no completed focus session is awaiting feedback")]
    NoPendingFeedback,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
