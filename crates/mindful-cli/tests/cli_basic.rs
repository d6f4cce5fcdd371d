//! Basic CLI E2E tests.
//!
//! Each test points `MINDFUL_HOME` at its own temp dir so config writes
//! never touch the real home directory.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str], stdin: Option<&str>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_mindful"))
        .args(args)
        .env("MINDFUL_HOME", home.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).unwrap();
        }
    }

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

#[test]
fn test_presets_json() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["presets", "--json"], None);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let durations = parsed["durations"].as_array().unwrap();
    assert_eq!(durations.len(), 10);
    assert_eq!(durations[0]["label"], "30s");
    assert_eq!(durations[9]["secs"], 3600);
    assert_eq!(parsed["sounds"].as_array().unwrap().len(), 4);
    assert_eq!(parsed["chime_intervals_min"], serde_json::json!([0, 1, 5, 10, 15]));
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "set", "session.sound", "forest"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(&home, &["config", "get", "session.sound"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("forest"));
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_config_rejects_non_preset_duration() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["config", "set", "session.duration_secs", "420"], None);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));

    let (stdout, _, _) = run_cli(&home, &["config", "get", "session.duration_secs"], None);
    assert_eq!(stdout.trim(), "600");
}

#[test]
fn test_config_list_is_json() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "list"], None);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["session"]["chime_interval_min"], 5);
    assert_eq!(parsed["display"]["bell"], true);
}

#[test]
fn test_run_json_status_snapshot() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(
        &home,
        &["run", "--json", "--mute", "--duration", "5m", "--sound", "none"],
        Some("status\nquit\n"),
    );
    assert_eq!(code, 0);

    let snapshot = stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .find(|event| event["type"] == "state_snapshot")
        .expect("no state_snapshot event");
    assert_eq!(snapshot["state"], "idle");
    assert_eq!(snapshot["remaining_secs"], 300);
    assert_eq!(snapshot["settings"]["sound"], "none");
}

#[test]
fn test_run_rejects_unknown_sound() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["run", "--sound", "ocean"], Some(""));
    assert_eq!(code, 1);
    assert!(stderr.contains("ocean"));
}

#[test]
fn test_run_help_describes_fade_and_mute() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["run", "--help"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("instantly instead of the 2 s fade"));
    assert!(stdout.contains("--mute"));
}

#[test]
fn test_run_muted_start_reports_started() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(
        &home,
        &["run", "--json", "--mute", "--start", "--duration", "30s"],
        Some("quit\n"),
    );
    assert_eq!(code, 0);
    let started = stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .find(|event| event["type"] == "timer_started")
        .expect("no timer_started event");
    assert_eq!(started["remaining_secs"], 30);
    assert_eq!(started["resumed"], false);
}
