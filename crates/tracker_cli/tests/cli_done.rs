use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tracker-{nanos}-{name}"))
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tracker"))
        .args(args)
        .env("TRACKER_STORE_DIR", dir)
        .env("TRACKER_CONFIG_PATH", dir.join("config.json"))
        .output()
        .expect("failed to run tracker")
}

fn add(dir: &Path, title: &str) -> String {
    let output = run(dir, &["add", title, "--json"]);
    assert!(output.status.success());
    let task: Value = serde_json::from_slice(&output.stdout).expect("json output");
    task["id"].as_str().expect("id").to_string()
}

#[test]
fn done_records_note_actual_time_and_history() {
    let dir = temp_path("done-full");
    let id = add(&dir, "Send report");
    let output = run(&dir, &["done", &id, "-m", "Sent to the team", "--actual", "20", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let task: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(task["status"], "completed");
    assert!(task["completedAt"].is_string());
    assert_eq!(task["completionNote"], "Sent to the team");
    assert_eq!(task["metrics"]["actualTime"], 20);
    assert_eq!(task["metrics"]["streak"], 1);

    let actions: Vec<&str> = task["history"]
        .as_array()
        .expect("history")
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert_eq!(actions, vec!["created", "updated", "completed"]);
}

#[test]
fn done_twice_is_rejected() {
    let dir = temp_path("done-twice");
    let id = add(&dir, "Once");
    let first = run(&dir, &["done", &id]);
    let second = run(&dir, &["done", &id]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(first.status.success());
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("task already completed"));
}

#[test]
fn done_unknown_id_is_rejected() {
    let dir = temp_path("done-missing");
    let output = run(&dir, &["done", "missing"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("task not found"));
}

#[test]
fn note_and_edit_append_history() {
    let dir = temp_path("note-edit");
    let id = add(&dir, "Draft");
    let noted = run(&dir, &["note", &id, "Waiting on numbers"]);
    let blank = run(&dir, &["note", &id, "  "]);
    let edited = run(&dir, &["edit", &id, "--title", "Final draft", "--clear-end", "--json"]);
    let empty_edit = run(&dir, &["edit", &id]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(noted.status.success());
    assert!(String::from_utf8_lossy(&blank.stderr).contains("note text is required"));
    assert!(String::from_utf8_lossy(&empty_edit.stderr).contains("nothing to update"));

    let task: Value = serde_json::from_slice(&edited.stdout).expect("json output");
    assert_eq!(task["title"], "Final draft");
    assert_eq!(task["notes"][0]["text"], "Waiting on numbers");
    assert_eq!(task["history"][1]["action"], "note_added");
    assert_eq!(task["history"][2]["action"], "updated");
}

#[test]
fn delete_removes_task_from_store() {
    let dir = temp_path("delete");
    let id = add(&dir, "Temporary");
    let deleted = run(&dir, &["delete", &id]);
    let listed = run(&dir, &["list", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(deleted.status.success());
    let tasks: Value = serde_json::from_slice(&listed.stdout).expect("json output");
    assert_eq!(tasks, serde_json::json!([]));
}
