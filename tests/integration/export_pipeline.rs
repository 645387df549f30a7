//! Integration tests for the export pipeline against an in-memory server

use device_backup_exporter::cli::{run_pipeline, CliError};
use device_backup_exporter::exporter::ExportContext;
use device_backup_exporter::fetcher::MemoryApi;
use device_backup_exporter::publish::SystemCommandRunner;
use device_backup_exporter::{format_backup_date, Config};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn local_config(backup_type: &str) -> Config {
    let settings: HashMap<&str, &str> = HashMap::from([
        ("unimus_server_address", "http://unimus.example.com:8085"),
        ("unimus_api_key", "test-key"),
        ("backup_type", backup_type),
        ("export_type", "fs"),
    ]);
    Config::from_lookup(|key| settings.get(key).map(|v| v.to_string())).unwrap()
}

fn healthy() -> MemoryApi {
    MemoryApi::new().with_response("health", json!({"data": {"status": "OK"}}))
}

fn latest_server() -> MemoryApi {
    healthy()
        .with_page("devices?page=0", json!([{"id": 7, "address": "core-sw1"}]))
        .with_page(
            "devices/backups/latest?page=0",
            json!([{
                "deviceId": 7,
                "backup": {"validSince": 1700000000, "bytes": "Y29uZmlnLXRleHQ=", "type": "TEXT"}
            }]),
        )
}

#[tokio::test]
async fn test_latest_export_writes_decoded_backup() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("backups");
    let mut ctx = ExportContext::new(local_config("latest"), latest_server(), &root);

    let report = run_pipeline(&mut ctx, &SystemCommandRunner).await.unwrap();

    assert_eq!(report.summary.exported, 1);
    assert_eq!(report.summary.written, 1);
    assert!(report.publish.is_none());

    let date = format_backup_date(Some(1700000000));
    let file = root
        .join("core-sw1 - 7")
        .join(format!("Backup core-sw1 {date} 7.txt"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "config-text");
}

#[tokio::test]
async fn test_second_run_leaves_existing_files_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("backups");

    let mut first = ExportContext::new(local_config("latest"), latest_server(), &root);
    run_pipeline(&mut first, &SystemCommandRunner).await.unwrap();

    let date = format_backup_date(Some(1700000000));
    let file = root
        .join("core-sw1 - 7")
        .join(format!("Backup core-sw1 {date} 7.txt"));
    fs::write(&file, "edited by hand").unwrap();

    let mut second = ExportContext::new(local_config("latest"), latest_server(), &root);
    let report = run_pipeline(&mut second, &SystemCommandRunner).await.unwrap();

    assert_eq!(report.summary.exported, 1);
    assert_eq!(report.summary.written, 0);
    assert_eq!(report.summary.skipped_existing, 1);
    assert_eq!(fs::read_to_string(&file).unwrap(), "edited by hand");
}

#[tokio::test]
async fn test_all_mode_exports_every_backup_of_every_device() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("backups");
    let api = healthy()
        .with_page(
            "devices?page=0",
            json!([{"id": 1, "address": "edge-1"}, {"id": 2, "address": "edge-2"}]),
        )
        .with_page(
            "devices/1/backups?page=0",
            json!([
                {"validSince": 1700000000, "bytes": "b25l", "type": "TEXT"},
                {"validSince": 1700003600, "bytes": "AAEC", "type": "BINARY"}
            ]),
        )
        .with_page(
            "devices/2/backups?page=0",
            json!([{"validSince": 1700000000, "bytes": "dHdv", "type": "TEXT"}]),
        );
    let mut ctx = ExportContext::new(local_config("all"), api, &root);

    let report = run_pipeline(&mut ctx, &SystemCommandRunner).await.unwrap();
    assert_eq!(report.summary.exported, 3);
    assert_eq!(report.summary.written, 3);

    let binary = root.join("edge-1 - 1").join(format!(
        "Backup edge-1 {} 1.bin",
        format_backup_date(Some(1700003600))
    ));
    assert_eq!(fs::read(binary).unwrap(), vec![0u8, 1, 2]);
    assert_eq!(fs::read_dir(root.join("edge-2 - 2")).unwrap().count(), 1);

    assert!(ctx
        .api()
        .requests()
        .contains(&"devices/2/backups?page=1".to_string()));
}

#[tokio::test]
async fn test_bad_payload_is_skipped_and_run_continues() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("backups");
    let api = healthy()
        .with_page("devices?page=0", json!([{"id": 1, "address": "edge-1"}]))
        .with_page(
            "devices/backups/latest?page=0",
            json!([
                {"deviceId": 1, "backup": {"validSince": 1700000000, "bytes": "!!not base64!!", "type": "TEXT"}},
                {"deviceId": 2, "backup": {"validSince": 1700000000, "bytes": "b2s=", "type": "TEXT"}}
            ]),
        );
    let mut ctx = ExportContext::new(local_config("latest"), api, &root);

    let report = run_pipeline(&mut ctx, &SystemCommandRunner).await.unwrap();
    assert_eq!(report.summary.exported, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.written, 1);
    assert!(root.join("device-2 - 2").is_dir());
}

#[tokio::test]
async fn test_unhealthy_server_stops_before_export() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("backups");
    let api = MemoryApi::new().with_response("health", json!({"data": {"status": "LICENSING_UNREACHABLE"}}));
    let mut ctx = ExportContext::new(local_config("latest"), api, &root);

    let err = run_pipeline(&mut ctx, &SystemCommandRunner).await.unwrap_err();
    assert!(matches!(err, CliError::HealthError(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(ctx.api().requests(), vec!["health".to_string()]);
    assert!(!root.exists());
}

#[tokio::test]
async fn test_device_listing_failure_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let api = healthy().with_failure("devices?page=0");
    let mut ctx = ExportContext::new(local_config("latest"), api, temp_dir.path().join("backups"));

    let err = run_pipeline(&mut ctx, &SystemCommandRunner).await.unwrap_err();
    assert!(matches!(err, CliError::FetcherError(_)));
    assert_eq!(err.exit_code(), 1);
}
