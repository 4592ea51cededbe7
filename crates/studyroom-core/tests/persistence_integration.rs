//! Integration tests for persistence through the SQLite-backed store.

use chrono::NaiveDate;
use studyroom_core::storage::database::STATE_KEY;
use studyroom_core::{
    Config, Database, Difficulty, FixedClock, StateStore, StudyController, StudyState,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studyroom.db");

    let expected = {
        let db = Database::open_at(&path).unwrap();
        let mut c = StudyController::new(db, FixedClock::at_day(today()), Config::default());
        c.add_subject("Geography", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), None)
            .unwrap();
        c.skip().unwrap();
        c.rate(Difficulty::Easy).unwrap();
        c.toggle_studied_today().unwrap();
        c.state().clone()
    };

    let db = Database::open_at(&path).unwrap();
    let c = StudyController::new(db, FixedClock::at_day(today()), Config::default());
    assert_eq!(c.state(), &expected);
    assert_eq!(c.state().cycle_count, 1);
    assert_eq!(c.timer().cycle_count(), 1);
    assert_eq!(c.state().subjects[0].interval_days, 2);
}

#[test]
fn test_corrupted_state_recovers_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studyroom.db");
    {
        let db = Database::open_at(&path).unwrap();
        db.kv_set(STATE_KEY, r#"{"subjects": [{"id": 3}]}"#).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let mut c = StudyController::new(db, FixedClock::at_day(today()), Config::default());
    assert_eq!(c.state(), &StudyState::default());

    // The next save overwrites the broken document.
    c.add_subject("Art", today(), None).unwrap();
    let db = Database::open_at(&path).unwrap();
    assert_eq!(db.load().subjects.len(), 1);
}

#[test]
fn test_timer_snapshot_resumes_pending_feedback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studyroom.db");

    let snapshot = {
        let db = Database::open_at(&path).unwrap();
        let mut c = StudyController::new(db, FixedClock::at_day(today()), Config::default());
        c.add_subject("Music", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), None)
            .unwrap();
        c.skip().unwrap();
        serde_json::to_string(c.timer()).unwrap()
    };

    let db = Database::open_at(&path).unwrap();
    let mut c = StudyController::new(db, FixedClock::at_day(today()), Config::default());
    c.restore_timer(serde_json::from_str(&snapshot).unwrap());
    assert!(c.timer().is_awaiting_feedback());
    assert!(c.start().is_err());
    c.rate(Difficulty::Medium).unwrap();
    assert_eq!(c.state().subjects[0].interval_days, 2);
    assert_eq!(c.state().sessions[0].difficulty, Some(Difficulty::Medium));
}

#[test]
fn test_removed_pending_session_is_never_replaced_by_an_older_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studyroom.db");
    let exam = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

    let (snapshot, math, dismissed) = {
        let db = Database::open_at(&path).unwrap();
        let mut c = StudyController::new(db, FixedClock::at_day(today()), Config::default());
        c.add_subject("Math", exam, None).unwrap();
        c.add_subject("Physics", exam, None).unwrap();
        let math = c.state().subjects[0].clone();
        let physics = c.state().subjects[1].id.clone();

        // Math's session is left unrated.
        c.skip().unwrap();
        let dismissed = c.state().sessions[0].id.clone();
        c.dismiss_feedback().unwrap();

        c.select_subject(Some(&physics)).unwrap();
        c.set_mode(studyroom_core::TimerMode::Pomodoro).unwrap();
        c.skip().unwrap();
        c.remove_subject(&physics).unwrap();
        (serde_json::to_string(c.timer()).unwrap(), math, dismissed)
    };

    let db = Database::open_at(&path).unwrap();
    let mut c = StudyController::new(db, FixedClock::at_day(today()), Config::default());
    c.restore_timer(serde_json::from_str(&snapshot).unwrap());
    assert!(c.timer().is_awaiting_feedback());
    assert!(c.pending_session().is_none());

    let events = c.rate(Difficulty::Easy).unwrap();
    assert!(!events
        .iter()
        .any(|e| matches!(e, studyroom_core::Event::FeedbackApplied { .. })));
    assert!(!c.timer().is_awaiting_feedback());
    assert_eq!(c.state().subjects, vec![math]);
    assert_eq!(c.state().session(&dismissed).unwrap().difficulty, None);
}

#[test]
fn test_pending_session_id_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studyroom.db");

    let pending = {
        let db = Database::open_at(&path).unwrap();
        let mut c = StudyController::new(db, FixedClock::at_day(today()), Config::default());
        c.add_subject("Music", today(), None).unwrap();
        c.skip().unwrap();
        c.pending_session().unwrap().id.clone()
    };

    let db = Database::open_at(&path).unwrap();
    assert_eq!(db.load().pending_session, Some(pending));
}
