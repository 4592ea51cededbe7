//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_studyroom"))
        .env("STUDYROOM_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

/// Parse every JSON document printed to stdout.
fn json_docs(stdout: &str) -> Vec<Value> {
    serde_json::Deserializer::from_str(stdout)
        .into_iter::<Value>()
        .map(|v| v.expect("stdout should be JSON"))
        .collect()
}

fn add_subject(dir: &Path, name: &str) -> String {
    let (code, stdout, stderr) = run_cli(dir, &["subject", "add", name, "--exam", "2099-01-01"]);
    assert_eq!(code, 0, "subject add failed: {stderr}");
    let event = &json_docs(&stdout)[0];
    assert_eq!(event["type"], "SubjectAdded");
    event["subject_id"].as_str().unwrap().to_string()
}

#[test]
fn test_subject_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    add_subject(dir.path(), "Biology");
    add_subject(dir.path(), "Chemistry");

    let (code, stdout, _) = run_cli(dir.path(), &["subject", "list"]);
    assert_eq!(code, 0);
    let list = &json_docs(&stdout)[0];
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Biology", "Chemistry"]);

    let (code, stdout, _) = run_cli(dir.path(), &["subject", "due"]);
    assert_eq!(code, 0);
    assert_eq!(json_docs(&stdout)[0].as_array().unwrap().len(), 2);
}

#[test]
fn test_blank_subject_name_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["subject", "add", "  ", "--exam", "2099-01-01"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_skip_then_rate_reschedules() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_subject(dir.path(), "History");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "skip"]);
    assert_eq!(code, 0);
    let types: Vec<String> = json_docs(&stdout)
        .iter()
        .map(|e| e["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, vec!["FocusCompleted", "SessionRecorded"]);

    // Nothing starts until the session is rated.
    let (code, _, stderr) = run_cli(dir.path(), &["timer", "start"]);
    assert_eq!(code, 1, "start should be refused: {stderr}");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "rate", "medium"]);
    assert_eq!(code, 0);
    let applied = &json_docs(&stdout)[0];
    assert_eq!(applied["type"], "FeedbackApplied");
    assert_eq!(applied["subject_id"], id.as_str());
    assert_eq!(applied["interval_days"], 2);

    let (_, stdout, _) = run_cli(dir.path(), &["timer", "status"]);
    let status = json_docs(&stdout).pop().unwrap();
    assert_eq!(status["awaiting_feedback"], false);
    assert_eq!(status["cycle_count"], 1);
    assert_eq!(status["running"], true);
}

#[test]
fn test_rate_without_pending_session_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["timer", "rate", "easy"]);
    assert_eq!(code, 1);
}

#[test]
fn test_studied_mark_counts_toward_streak() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stdout, _) = run_cli(dir.path(), &["stats", "streak"]);
    assert_eq!(stdout.trim(), "0");

    let (code, _, _) = run_cli(dir.path(), &["studied"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["stats", "streak"]);
    assert_eq!(stdout.trim(), "1");

    let (_, stdout, _) = run_cli(dir.path(), &["stats", "today"]);
    assert_eq!(json_docs(&stdout)[0]["completed"], 1);

    run_cli(dir.path(), &["studied", "--clear"]);
    let (_, stdout, _) = run_cli(dir.path(), &["stats", "streak"]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_config_set_clamps() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "set", "timer.pomodoro_minutes", "500"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "timer.pomodoro_minutes = 90");

    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "timer.pomodoro_minutes"]);
    assert_eq!(stdout.trim(), "90");

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_export_import_roundtrip_between_dirs() {
    let src = tempfile::tempdir().unwrap();
    add_subject(src.path(), "Music");
    let backup = src.path().join("backup.json");
    let (code, _, _) = run_cli(
        src.path(),
        &["data", "export", "--output", backup.to_str().unwrap()],
    );
    assert_eq!(code, 0);

    let dst = tempfile::tempdir().unwrap();
    // A timer waiting for feedback in the target is discarded by the import.
    run_cli(dst.path(), &["timer", "skip"]);
    let (code, stdout, _) = run_cli(dst.path(), &["data", "import", backup.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("imported 1 subjects"));

    let (_, stdout, _) = run_cli(dst.path(), &["subject", "list"]);
    assert_eq!(json_docs(&stdout)[0][0]["name"], "Music");

    let (_, stdout, _) = run_cli(dst.path(), &["timer", "status"]);
    let status = json_docs(&stdout).pop().unwrap();
    assert_eq!(status["awaiting_feedback"], false);
    assert_eq!(status["cycle_count"], 0);
    assert_eq!(status["running"], false);
}

#[test]
fn test_remove_subject_by_name() {
    let dir = tempfile::tempdir().unwrap();
    add_subject(dir.path(), "Art");
    run_cli(dir.path(), &["timer", "skip"]);
    run_cli(dir.path(), &["timer", "dismiss"]);

    let (code, stdout, _) = run_cli(dir.path(), &["subject", "remove", "art"]);
    assert_eq!(code, 0);
    assert_eq!(json_docs(&stdout)[0]["sessions_removed"], 1);

    let (_, stdout, _) = run_cli(dir.path(), &["stats", "log"]);
    assert!(json_docs(&stdout)[0].as_array().unwrap().is_empty());
}

#[test]
fn test_completions_generate() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("studyroom"));
}
