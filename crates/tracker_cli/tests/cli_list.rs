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

fn titles(output: &Output) -> Vec<String> {
    let tasks: Value = serde_json::from_slice(&output.stdout).expect("json output");
    tasks
        .as_array()
        .expect("task list")
        .iter()
        .filter_map(|task| task["title"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn list_filters_by_search_status_and_tags() {
    let dir = temp_path("list-filters");
    run(&dir, &["add", "Write report", "--tag", "work", "--priority", "4"]);
    run(&dir, &["add", "Buy groceries", "--tag", "home"]);
    let added = run(&dir, &["add", "Review report", "--tag", "work", "--json"]);
    let review: Value = serde_json::from_slice(&added.stdout).expect("json output");
    run(&dir, &["done", review["id"].as_str().expect("id")]);

    let search = run(&dir, &["list", "--search", "REPORT", "--json"]);
    let padded = run(&dir, &["list", "--search", "  report ", "--json"]);
    let active = run(&dir, &["list", "--status", "active", "--tag", "work", "--json"]);
    let priority = run(&dir, &["list", "--priority", "4", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(titles(&search), vec!["Write report", "Review report"]);
    assert_eq!(titles(&padded), vec!["Write report", "Review report"]);
    assert_eq!(titles(&active), vec!["Write report"]);
    assert_eq!(titles(&priority), vec!["Write report"]);
}

#[test]
fn list_end_date_filter_excludes_open_ended_tasks() {
    let dir = temp_path("list-dates");
    run(&dir, &["add", "Bounded", "--start", "2025-01-01", "--end", "2025-01-10"]);
    run(&dir, &["add", "Open", "--start", "2025-01-01"]);

    let bounded = run(&dir, &["list", "--to", "2025-01-31", "--json"]);
    let from = run(&dir, &["list", "--from", "2025-01-02", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(titles(&bounded), vec!["Bounded"]);
    assert!(titles(&from).is_empty());
}

#[test]
fn list_plain_renders_table() {
    let dir = temp_path("list-plain");
    run(&dir, &["add", "Table row"]);
    let output = run(&dir, &["list"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Title"));
    assert!(stdout.contains("Table row"));
}
