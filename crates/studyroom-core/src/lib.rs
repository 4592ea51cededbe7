//! # Studyroom Core Library
//!
//! Core business logic for Studyroom, a study planner built around focus
//! sessions. Every operation is available through the standalone CLI; any
//! other front end is a thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a countdown state machine over focus, short-break and
//!   long-break modes. The caller delivers ticks; a completed focus interval
//!   holds the timer until difficulty feedback arrives
//! - **Scheduler**: a three-bucket spaced-repetition rule that turns feedback
//!   into the subject's next review date
//! - **Stats**: pure aggregation over sessions and manual studied marks (due
//!   list, streak, daily goal, per-subject numbers, achievements)
//! - **Storage**: the whole state as one JSON document in SQLite, plus a TOML
//!   configuration file
//!
//! ## Key Components
//!
//! - [`StudyController`]: owns the state record and routes every mutation
//! - [`TimerEngine`]: timer state machine
//! - [`apply_feedback`]: spaced-repetition update
//! - [`StateStore`]: persistence collaborator, [`Database`] in production
//! - [`Config`]: application configuration management

pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod model;
pub mod notify;
pub mod scheduler;
pub mod stats;
pub mod storage;
pub mod store;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::{StudyController, SubjectEdit};
pub use error::{ConfigError, CoreError, DatabaseError, Result, TimerError, ValidationError};
pub use events::Event;
pub use model::{Difficulty, Session, SessionKind, StudyState, Subject};
pub use notify::{AudioCue, Notifier, NullAudio, NullNotifier, Permission};
pub use scheduler::apply_feedback;
pub use stats::{ActivityRange, Overview};
pub use storage::{Config, Database, MemoryStore, StateStore};
pub use timer::{select_break, TimerEngine, TimerMode, TimerSettings};
