use chrono::NaiveDate;
use clap::Subcommand;
use studyroom_core::{StudyState, SubjectEdit};

use super::{open_controller, print_json};

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a subject, due for review today
    Add {
        name: String,
        /// Exam date (YYYY-MM-DD)
        #[arg(long)]
        exam: NaiveDate,
        /// Display color (e.g. "#ef4444")
        #[arg(long)]
        color: Option<String>,
    },
    /// List subjects with their statistics
    List,
    /// Edit subject fields; review fields bypass the scheduler
    Edit {
        /// Subject id, id prefix or name
        subject: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        exam: Option<NaiveDate>,
        #[arg(long)]
        color: Option<String>,
        /// Next review date (YYYY-MM-DD)
        #[arg(long)]
        review: Option<NaiveDate>,
        /// Review interval in days
        #[arg(long)]
        interval: Option<u32>,
    },
    /// Remove a subject and all of its sessions
    Remove {
        /// Subject id, id prefix or name
        subject: String,
    },
    /// Choose the subject credited by the next focus session (omit to clear)
    Select {
        /// Subject id, id prefix or name
        subject: Option<String>,
    },
    /// Subjects due for review today
    Due,
}

/// Resolve a subject by exact id, unique id prefix or case-insensitive name.
fn resolve(state: &StudyState, query: &str) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(subject) = state.subject(query) {
        return Ok(subject.id.clone());
    }
    let by_name: Vec<_> = state
        .subjects
        .iter()
        .filter(|s| s.name.eq_ignore_ascii_case(query))
        .collect();
    if let [subject] = by_name.as_slice() {
        return Ok(subject.id.clone());
    }
    let by_prefix: Vec<_> = state
        .subjects
        .iter()
        .filter(|s| s.id.starts_with(query))
        .collect();
    match by_prefix.as_slice() {
        [subject] => Ok(subject.id.clone()),
        [] if by_name.is_empty() => Err(format!("no subject matches '{query}'").into()),
        _ => Err(format!("'{query}' matches more than one subject").into()),
    }
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_controller()?;

    match action {
        SubjectAction::Add { name, exam, color } => {
            let event = controller.add_subject(&name, exam, color.as_deref())?;
            print_json(&event)?;
        }
        SubjectAction::List => {
            print_json(&controller.subject_stats())?;
        }
        SubjectAction::Edit {
            subject,
            name,
            exam,
            color,
            review,
            interval,
        } => {
            let id = resolve(controller.state(), &subject)?;
            let edit = SubjectEdit {
                name,
                exam_date: exam,
                color,
                next_review_date: review,
                interval_days: interval,
            };
            let event = controller.edit_subject(&id, edit)?;
            print_json(&event)?;
        }
        SubjectAction::Remove { subject } => {
            let id = resolve(controller.state(), &subject)?;
            let event = controller.remove_subject(&id)?;
            print_json(&event)?;
        }
        SubjectAction::Select { subject } => {
            let id = subject
                .map(|query| resolve(controller.state(), &query))
                .transpose()?;
            controller.select_subject(id.as_deref())?;
            match id {
                Some(id) => println!("selected {}", controller.state().subject_name(Some(&id))),
                None => println!("selection cleared"),
            }
        }
        SubjectAction::Due => {
            print_json(&controller.due_today())?;
        }
    }
    Ok(())
}

/// Set or clear the manual studied mark for `date` (today by default).
pub fn mark_studied(date: Option<NaiveDate>, clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_controller()?;
    let day = date.unwrap_or_else(|| controller.today());
    match controller.set_studied(day, !clear)? {
        Some(event) => print_json(&event)?,
        None => println!("{day} unchanged"),
    }
    Ok(())
}

pub fn annotate(session_id: &str, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_controller()?;
    let id = controller
        .state()
        .sessions
        .iter()
        .find(|s| s.id == session_id || s.id.starts_with(session_id))
        .map(|s| s.id.clone())
        .ok_or_else(|| format!("no session matches '{session_id}'"))?;
    controller.annotate_session(&id, text)?;
    println!("note saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyroom_core::Subject;

    fn state() -> StudyState {
        let day = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        let mut state = StudyState::default();
        for (id, name) in [("abc-1", "Math"), ("abd-2", "Physics"), ("xyz-3", "math")] {
            let mut s = Subject::new(name, day, day);
            s.id = id.to_string();
            state.subjects.push(s);
        }
        state
    }

    #[test]
    fn resolves_exact_id_and_unique_prefix() {
        let state = state();
        assert_eq!(resolve(&state, "abd-2").unwrap(), "abd-2");
        assert_eq!(resolve(&state, "xy").unwrap(), "xyz-3");
        assert_eq!(resolve(&state, "physics").unwrap(), "abd-2");
    }

    #[test]
    fn ambiguous_or_missing_queries_fail() {
        let state = state();
        assert!(resolve(&state, "ab").is_err());
        assert!(resolve(&state, "MATH").is_err());
        assert!(resolve(&state, "chemistry").is_err());
    }
}
