//! Response parser
//!
//! Stateless conversion of API JSON records into typed values. Listing records
//! are parsed leniently: a field that is missing or of the wrong shape yields
//! `None` rather than an error, and callers decide whether that skips the
//! record.

use serde_json::Value;

use crate::{BackupRecord, Device, DeviceId};

/// Stateless parser for API responses
pub struct ResponseParser;

impl ResponseParser {
    /// Extract `data.status` from a health response
    ///
    /// Numbers and booleans are rendered as text so they are reported as a
    /// status. Null, objects and arrays count as no status.
    pub fn parse_health_status(body: &Value) -> Option<String> {
        match body.get("data")?.get("status")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Parse a `devices` listing record
    ///
    /// Returns `None` when either `id` or `address` is missing, null or empty.
    pub fn parse_device(record: &Value) -> Option<Device> {
        let id = DeviceId::from_json(record.get("id")?)?;
        let address = record.get("address")?.as_str()?.trim();
        if address.is_empty() {
            return None;
        }
        Some(Device {
            id,
            address: address.to_string(),
        })
    }

    /// Parse a record of `devices/{id}/backups`
    pub fn parse_device_backup(device_id: &DeviceId, record: &Value) -> BackupRecord {
        Self::parse_backup_fields(device_id.clone(), record)
    }

    /// Parse a record of `devices/backups/latest`
    ///
    /// The record embeds `deviceId` and a nested `backup` object. Returns
    /// `None` when `deviceId` is missing; a missing `backup` object yields a
    /// record with no timestamp and no payload.
    pub fn parse_latest_backup(record: &Value) -> Option<BackupRecord> {
        let device_id = DeviceId::from_json(record.get("deviceId")?)?;
        let backup = record.get("backup").unwrap_or(&Value::Null);
        Some(Self::parse_backup_fields(device_id, backup))
    }

    fn parse_backup_fields(device_id: DeviceId, backup: &Value) -> BackupRecord {
        BackupRecord {
            device_id,
            valid_since: backup.get("validSince").and_then(Self::parse_timestamp),
            payload: backup
                .get("bytes")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            type_tag: backup
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Seconds since the epoch from a number or numeric string
    fn parse_timestamp(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}
