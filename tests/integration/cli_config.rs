//! Integration tests for configuration handling through the binary
//!
//! Every case either fails validation before any network call or points at a
//! closed local port, so no server is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn exporter(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("device-backup-exporter").unwrap();
    cmd.env_clear()
        .current_dir(temp_dir.path())
        .arg("--log-file")
        .arg(temp_dir.path().join("exporter.log"));
    cmd
}

fn with_base_env(cmd: &mut Command) -> &mut Command {
    cmd.env("unimus_server_address", "http://127.0.0.1:9")
        .env("unimus_api_key", "secret-api-key")
        .env("backup_type", "latest")
        .env("export_type", "fs")
}

#[test]
fn test_missing_api_key_exits_with_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = exporter(&temp_dir);
    cmd.env("unimus_server_address", "http://127.0.0.1:9")
        .env("backup_type", "latest")
        .env("export_type", "fs")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("unimus_api_key is not set"));

    assert!(!temp_dir.path().join("backups").exists());
}

#[test]
fn test_http_git_without_password_exits_with_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = exporter(&temp_dir);
    with_base_env(&mut cmd)
        .env("export_type", "git")
        .env("git_username", "ops")
        .env("git_email", "ops@example.com")
        .env("git_server_protocol", "http")
        .env("git_server_address", "git.example.com")
        .env("git_port", "80")
        .env("git_repo_name", "backups")
        .env("git_branch", "main")
        .assert()
        .code(2);

    assert!(!temp_dir.path().join("backups").exists());
}

#[test]
fn test_unknown_backup_type_exits_with_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = exporter(&temp_dir);
    with_base_env(&mut cmd)
        .env("backup_type", "newest")
        .assert()
        .code(2);
}

#[test]
fn test_uppercase_environment_names_are_accepted() {
    let temp_dir = TempDir::new().unwrap();
    exporter(&temp_dir)
        .env("UNIMUS_SERVER_ADDRESS", "http://127.0.0.1:9")
        .env("UNIMUS_API_KEY", "secret-api-key")
        .env("BACKUP_TYPE", "all")
        .env("EXPORT_TYPE", "fs")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup type: all"));
}

#[test]
fn test_validate_prints_masked_summary() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = exporter(&temp_dir);
    with_base_env(&mut cmd)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Server address: http://127.0.0.1:9"))
        .stdout(predicate::str::contains("secret-api-key").not());
}

#[test]
fn test_validate_reads_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("exporter.toml");
    fs::write(
        &config_path,
        r#"
unimus_server_address = "http://127.0.0.1:9"
unimus_api_key = "secret-api-key"
backup_type = "latest"
export_type = "git"
git_username = "ops"
git_email = "ops@example.com"
git_server_protocol = "ssh"
git_server_address = "git.example.com"
git_port = 22
git_repo_name = "net/backups.git"
git_branch = "main"
"#,
    )
    .unwrap();

    exporter(&temp_dir)
        .arg("--config")
        .arg(&config_path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("git.example.com:22"));
}

#[test]
fn test_dotenv_in_working_directory_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".env"),
        "UNIMUS_SERVER_ADDRESS=http://127.0.0.1:9\nUNIMUS_API_KEY=secret-api-key\nBACKUP_TYPE=all\nEXPORT_TYPE=fs\n",
    )
    .unwrap();

    exporter(&temp_dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup type: all"));
}

#[test]
fn test_dotenv_overrides_environment() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".env"), "BACKUP_TYPE=all\n").unwrap();

    let mut cmd = exporter(&temp_dir);
    with_base_env(&mut cmd)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup type: all"));
}

#[test]
fn test_missing_config_file_exits_with_config_error() {
    let temp_dir = TempDir::new().unwrap();
    exporter(&temp_dir)
        .arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .assert()
        .code(2);
}

#[test]
fn test_unreachable_server_exits_with_failure() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = exporter(&temp_dir);
    with_base_env(&mut cmd).assert().code(1);
}
