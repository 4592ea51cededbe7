mod engine;
mod mode;

pub use engine::TimerEngine;
pub use mode::{select_break, TimerMode, TimerSettings};
