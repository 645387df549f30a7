//! Integration tests for logging

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_log_file_is_appended_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("exporter.log");

    for _ in 0..2 {
        Command::cargo_bin("device-backup-exporter")
            .unwrap()
            .env_clear()
            .current_dir(temp_dir.path())
            .arg("--log-file")
            .arg(&log_file)
            .assert()
            .code(2);
    }

    let contents = fs::read_to_string(&log_file).unwrap();
    assert_eq!(contents.matches("unimus_server_address is not set").count(), 2);
    assert!(!contents.contains("\u{1b}["), "log file must not contain ANSI escapes");
}

#[test]
fn test_json_log_format() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("exporter.log");

    Command::cargo_bin("device-backup-exporter")
        .unwrap()
        .env_clear()
        .env("LOG_FORMAT", "json")
        .current_dir(temp_dir.path())
        .arg("--log-file")
        .arg(&log_file)
        .assert()
        .code(2);

    let contents = fs::read_to_string(&log_file).unwrap();
    let line = contents.lines().next().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(parsed["level"], "ERROR");
}
