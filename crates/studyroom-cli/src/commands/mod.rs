pub mod config;
pub mod data;
pub mod stats;
pub mod subject;
pub mod timer;

use studyroom_core::notify::Permission;
use studyroom_core::{
    AudioCue, Config, Database, Notifier, StudyController, SystemClock, TimerEngine,
};

pub type Controller = StudyController<Database, SystemClock>;

const ENGINE_KEY: &str = "timer_engine";

/// Writes reminders to stderr.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn notify(&mut self, title: &str, body: &str) {
        eprintln!("[{title}] {body}");
    }
}

/// Rings the terminal bell.
struct TerminalBell;

impl AudioCue for TerminalBell {
    fn play_completion_sound(&mut self) {
        eprint!("\x07");
    }
}

/// Open the database, load config and resume the saved timer.
pub fn open_controller() -> Result<Controller, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let engine = load_engine(&db);
    let mut controller = StudyController::new(db, SystemClock, config)
        .with_notifier(Box::new(TerminalNotifier))
        .with_audio(Box::new(TerminalBell));
    if let Some(engine) = engine {
        controller.restore_timer(engine);
    }
    controller.remind_due()?;
    Ok(controller)
}

fn load_engine(db: &Database) -> Option<TimerEngine> {
    let json = db.kv_get(ENGINE_KEY).ok().flatten()?;
    match serde_json::from_str::<TimerEngine>(&json) {
        Ok(engine) => Some(engine),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable timer snapshot");
            None
        }
    }
}

pub fn save_engine(controller: &Controller) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(controller.timer())?;
    controller.store().kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Forget the saved timer; the next invocation starts from the stored cycle count.
pub fn clear_engine(controller: &Controller) -> Result<(), Box<dyn std::error::Error>> {
    controller.store().kv_delete(ENGINE_KEY)?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
