use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("wbam-{prefix}-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write test file");
}

/// Run wbam against `root/wbam_ledger.json`, with HOME pointed at `root` so no
/// user config leaks in.
fn run_wbam(root: &Path, args: &[&str]) -> (bool, Vec<u8>, Vec<u8>) {
    let bin = std::env::var("CARGO_BIN_EXE_wbam").unwrap_or_else(|_| {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("target");
        path.push("debug");
        if cfg!(windows) {
            path.push("wbam.exe");
        } else {
            path.push("wbam");
        }
        path.to_string_lossy().into_owned()
    });
    let ledger = root.join("wbam_ledger.json");
    let output = Command::new(bin)
        .arg("--ledger")
        .arg(&ledger)
        .arg("--no-color")
        .args(args)
        .env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join(".config"))
        .env_remove("WBAM_LEDGER")
        .env_remove("WBAM_LOG")
        .output()
        .expect("run wbam");
    (output.status.success(), output.stdout, output.stderr)
}

fn run_json(root: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let (ok, stdout, stderr) = run_wbam(root, &full);
    assert!(ok, "stderr: {}", String::from_utf8_lossy(&stderr));
    serde_json::from_slice(&stdout).expect("json")
}

fn new_session(root: &Path, topic: &str) -> String {
    let session = run_json(root, &["session", "new", "--topic", topic, "--module", "M1"]);
    session["session_id"].as_str().expect("session_id").to_string()
}

fn read_ledger(root: &Path) -> Value {
    let raw = fs::read_to_string(root.join("wbam_ledger.json")).expect("read ledger");
    serde_json::from_str(&raw).expect("ledger json")
}

#[test]
fn session_new_persists_and_lists_newest_first() {
    let root = unique_temp_dir("sessions");
    let first = new_session(&root, "Joins");
    let second = new_session(&root, "Window functions");

    let ledger = read_ledger(&root);
    assert_eq!(ledger["meta"]["app"].as_str(), Some("WBAM Training App"));
    assert_eq!(ledger["meta"]["version"].as_str(), Some("1.0"));
    assert_eq!(ledger["sessions"].as_array().map(Vec::len), Some(2));
    assert_eq!(ledger["sessions"][0]["module"].as_str(), Some("M1"));
    assert_eq!(ledger["sessions"][0]["level"].as_u64(), Some(1));

    let listed = run_json(&root, &["session", "list"]);
    let ids: Vec<&str> = listed
        .as_array()
        .expect("array output")
        .iter()
        .filter_map(|s| s["session_id"].as_str())
        .collect();
    assert_eq!(ids, [second.as_str(), first.as_str()]);
}

#[test]
fn empty_ledger_lists_without_creating_file() {
    let root = unique_temp_dir("empty");
    let (ok, stdout, _) = run_wbam(&root, &["session", "list"]);
    assert!(ok);
    assert!(String::from_utf8_lossy(&stdout).contains("No sessions yet"));
    assert!(!root.join("wbam_ledger.json").exists());
}

#[test]
fn task_status_keeps_completed_at_in_step() {
    let root = unique_temp_dir("task-status");
    let session = new_session(&root, "Aggregation");
    let task = run_json(&root, &["task", "add", &session, "--title", "Dedupe rows"]);
    let task_id = task["task_id"].as_str().expect("task_id").to_string();
    assert_eq!(task["status"].as_str(), Some("todo"));
    assert!(task["completed_at"].is_null());

    let done = run_json(&root, &["task", "status", &task_id, "done"]);
    assert_eq!(done["status"].as_str(), Some("done"));
    assert!(done["completed_at"].is_string());

    let reopened = run_json(&root, &["task", "status", &task_id[..8], "doing"]);
    assert_eq!(reopened["status"].as_str(), Some("doing"));
    assert!(reopened["completed_at"].is_null());

    let ledger = read_ledger(&root);
    assert_eq!(ledger["tasks"][0]["status"].as_str(), Some("doing"));
}

#[test]
fn session_show_reports_next_objective() {
    let root = unique_temp_dir("objective");
    let session = new_session(&root, "Grain");
    run_json(&root, &["task", "add", &session, "-t", "A"]);
    run_json(&root, &["task", "add", &session, "-t", "B", "--status", "doing"]);

    let snapshot = run_json(&root, &["session", "show", &session]);
    assert_eq!(snapshot["next_objective"].as_str(), Some("Continue: B"));
    assert_eq!(snapshot["task_count"].as_u64(), Some(2));
    assert!(snapshot["latest_score"].is_null());

    let (ok, stdout, _) = run_wbam(&root, &["task", "list", &session]);
    assert!(ok);
    assert!(String::from_utf8_lossy(&stdout).contains("Continue: B"));
}

#[test]
fn score_add_clamps_and_defaults() {
    let root = unique_temp_dir("scores");
    let session = new_session(&root, "Scoring");
    let snapshot = run_json(
        &root,
        &["score", "add", &session, "--python=-5", "--sql", "abc", "--bi", "15"],
    );
    assert_eq!(snapshot["python"].as_f64(), Some(0.0));
    assert_eq!(snapshot["sql"].as_f64(), Some(0.0));
    assert_eq!(snapshot["bi"].as_f64(), Some(10.0));
    // Omitted skills start from the baseline
    assert_eq!(snapshot["banking"].as_f64(), Some(3.0));

    let next = run_json(&root, &["score", "add", &session, "--banking", "7"]);
    assert_eq!(next["bi"].as_f64(), Some(10.0));
    assert_eq!(next["banking"].as_f64(), Some(7.0));

    let shown = run_json(&root, &["session", "show", &session]);
    assert_eq!(shown["readiness"]["bi"].as_u64(), Some(100));
    assert_eq!(shown["readiness"]["banking"].as_u64(), Some(70));
}

#[test]
fn unknown_session_is_rejected() {
    let root = unique_temp_dir("unknown-session");
    new_session(&root, "Only one");
    let before = fs::read_to_string(root.join("wbam_ledger.json")).expect("read ledger");

    let (ok, _, stderr) = run_wbam(&root, &["task", "add", "no-such-session", "-t", "Orphan"]);
    assert!(!ok);
    assert!(
        String::from_utf8_lossy(&stderr).contains("Session not found"),
        "stderr: {}",
        String::from_utf8_lossy(&stderr)
    );
    let after = fs::read_to_string(root.join("wbam_ledger.json")).expect("read ledger");
    assert_eq!(before, after);
}

#[test]
fn empty_title_is_rejected() {
    let root = unique_temp_dir("empty-title");
    let session = new_session(&root, "Titles");
    let (ok, _, stderr) = run_wbam(&root, &["task", "add", &session, "--title", "   "]);
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("Missing required field: title"));
    assert_eq!(read_ledger(&root)["tasks"].as_array().map(Vec::len), Some(0));
}

#[test]
fn invalid_level_is_rejected() {
    let root = unique_temp_dir("level");
    let (ok, _, stderr) = run_wbam(&root, &["session", "new", "--level", "4"]);
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("Invalid level"));
    assert!(!root.join("wbam_ledger.json").exists());
}

#[test]
fn export_import_round_trip() {
    let root = unique_temp_dir("export");
    let session = new_session(&root, "Export");
    run_json(&root, &["task", "add", &session, "-t", "Reconcile totals", "-s", "done"]);
    run_json(
        &root,
        &["note", "add", &session, "-a", "grain = order line", "-n", "sum after dedupe"],
    );
    let exported = root.join("backup.json");
    let exported_arg = exported.to_string_lossy().into_owned();

    let (ok, _, stderr) = run_wbam(&root, &["export", "-o", &exported_arg]);
    assert!(ok, "stderr: {}", String::from_utf8_lossy(&stderr));
    let original = fs::read_to_string(root.join("wbam_ledger.json")).expect("read ledger");
    assert_eq!(fs::read_to_string(&exported).expect("read export"), original);

    let (ok, stdout, _) = run_wbam(&root, &["export"]);
    assert!(ok);
    assert_eq!(stdout, original.as_bytes());

    let other = unique_temp_dir("import");
    let (ok, _, stderr) = run_wbam(&other, &["import", &exported_arg]);
    assert!(ok, "stderr: {}", String::from_utf8_lossy(&stderr));
    let restored = fs::read_to_string(other.join("wbam_ledger.json")).expect("read ledger");
    assert_eq!(restored, original);
}

#[test]
fn import_missing_meta_leaves_ledger_unchanged() {
    let root = unique_temp_dir("import-bad");
    new_session(&root, "Keep me");
    let before = fs::read_to_string(root.join("wbam_ledger.json")).expect("read ledger");

    let bad = root.join("bad.json");
    write_file(&bad, r#"{"sessions": [], "tasks": [], "scores": [], "notes": []}"#);
    let (ok, _, stderr) = run_wbam(&root, &["import", &bad.to_string_lossy()]);
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("missing keys: meta"));

    let after = fs::read_to_string(root.join("wbam_ledger.json")).expect("read ledger");
    assert_eq!(before, after);
}

#[test]
fn reset_requires_confirmation() {
    let root = unique_temp_dir("reset");
    new_session(&root, "Gone soon");
    let created_at = read_ledger(&root)["meta"]["created_at"].clone();

    let (ok, _, stderr) = run_wbam(&root, &["reset"]);
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("--yes"));
    assert_eq!(read_ledger(&root)["sessions"].as_array().map(Vec::len), Some(1));

    std::thread::sleep(std::time::Duration::from_millis(5));
    let (ok, _, stderr) = run_wbam(&root, &["reset", "--yes"]);
    assert!(ok, "stderr: {}", String::from_utf8_lossy(&stderr));
    let ledger = read_ledger(&root);
    assert_eq!(ledger["sessions"].as_array().map(Vec::len), Some(0));
    assert_ne!(ledger["meta"]["created_at"], created_at);
}

#[test]
fn week1_creates_task_only_once() {
    let root = unique_temp_dir("week1");
    let session = new_session(&root, "Week 1");

    let first = run_json(
        &root,
        &["week1", &session, "-a", "one row per order line", "-n", "dedupe first"],
    );
    assert_eq!(first["note"]["action_answer"].as_str(), Some("one row per order line"));
    assert_eq!(first["task_created"]["status"].as_str(), Some("doing"));
    assert!(
        first["task_created"]["title"]
            .as_str()
            .is_some_and(|t| t.starts_with("Week 1: Data Grain Discipline"))
    );

    let second = run_json(&root, &["week1", &session, "-n", "more notes"]);
    assert!(second["task_created"].is_null());

    let ledger = read_ledger(&root);
    assert_eq!(ledger["tasks"].as_array().map(Vec::len), Some(1));
    assert_eq!(ledger["notes"].as_array().map(Vec::len), Some(2));

    let shown = run_json(&root, &["session", "show", &session]);
    assert!(
        shown["next_objective"]
            .as_str()
            .is_some_and(|o| o.starts_with("Continue: Week 1"))
    );
}

#[test]
fn notes_list_latest_first() {
    let root = unique_temp_dir("notes");
    let session = new_session(&root, "Notes");
    run_json(&root, &["note", "add", &session, "-n", "first"]);
    run_json(&root, &["note", "add", &session, "-n", "second"]);
    let notes = run_json(&root, &["note", "list", &session]);
    let texts: Vec<&str> = notes
        .as_array()
        .expect("array output")
        .iter()
        .filter_map(|n| n["technical_notes"].as_str())
        .collect();
    assert_eq!(texts, ["second", "first"]);
}

#[test]
fn malformed_ledger_is_reported() {
    let root = unique_temp_dir("malformed");
    write_file(&root.join("wbam_ledger.json"), "{ this is not json");
    let (ok, _, stderr) = run_wbam(&root, &["session", "list"]);
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("Malformed ledger file"));
    assert_eq!(
        fs::read_to_string(root.join("wbam_ledger.json")).expect("read ledger"),
        "{ this is not json"
    );

    let (ok, _, stderr) = run_wbam(&root, &["reset", "--yes"]);
    assert!(ok, "stderr: {}", String::from_utf8_lossy(&stderr));
    assert_eq!(read_ledger(&root)["sessions"].as_array().map(Vec::len), Some(0));
}

#[test]
fn invalid_timezone_exits_with_error() {
    let root = unique_temp_dir("timezone");
    let (ok, _, stderr) = run_wbam(&root, &["--timezone", "Mars/Olympus", "session", "list"]);
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("Invalid timezone"));
}
