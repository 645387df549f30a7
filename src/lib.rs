//! # Device Backup Exporter Library
//!
//! Pulls device configuration backups from a network-device management server
//! (REST API v2) and persists them to local disk, optionally committing and
//! pushing the backup tree to a remote git repository.
//!
//! ## Pipeline
//!
//! 1. [`config`] - load and validate settings from the environment or a TOML file
//! 2. [`health`] - confirm the server reports `OK`
//! 3. [`directory`] - page through `devices` and build the id → address map
//! 4. [`exporter`] - page through backups (`all` or `latest`) and write files
//! 5. [`publish`] - stage, commit and push the backup tree with git
//!
//! Each stage receives an [`exporter::ExportContext`] rather than reaching for
//! process-wide state, and every fatal failure is a typed error that bubbles
//! up to the binary, which maps it to an exit status.
//!
//! ## Quick Start
//!
//! ```no_run
//! use device_backup_exporter::config::Config;
//! use device_backup_exporter::exporter::ExportContext;
//! use device_backup_exporter::fetcher::http::UnimusHttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let api = UnimusHttpClient::new(&config.server_address, &config.api_key)?;
//! let mut ctx = ExportContext::new(config, api, "backups");
//!
//! device_backup_exporter::health::check(ctx.api()).await?;
//! ctx.load_directory().await?;
//! let summary = ctx.export_backups().await?;
//! println!("{} backups exported", summary.exported);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{Local, TimeZone};
use std::fmt;

/// CLI command implementations
pub mod cli;

/// Configuration loading and validation
pub mod config;

/// Device id → address directory
pub mod directory;

/// Backup retrieval pipeline
pub mod exporter;

/// REST API access
pub mod fetcher;

/// Server health check
pub mod health;

/// Backup file layout and writing
pub mod output;

/// Git publishing of the backup tree
pub mod publish;

pub use config::Config;
pub use directory::DeviceDirectory;

/// Date format used in backup file names
pub const BACKUP_DATE_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// Date string used when a backup carries no timestamp
pub const UNKNOWN_DATE: &str = "unknown";

/// Opaque device identifier as reported by the server
///
/// The API reports ids as JSON numbers, but nothing in the pipeline relies on
/// that, so textual ids are accepted as well. Numeric ids sort numerically and
/// before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceId {
    /// Numeric id (the common case)
    Numeric(i64),
    /// Any other non-empty textual id
    Text(String),
}

impl DeviceId {
    /// Extract a device id from a JSON value
    ///
    /// Returns `None` for null, empty strings and non-scalar values.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(id) => Some(DeviceId::Numeric(id)),
                None => Some(DeviceId::Text(n.to_string())),
            },
            serde_json::Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else if let Ok(id) = s.parse::<i64>() {
                    Some(DeviceId::Numeric(id))
                } else {
                    Some(DeviceId::Text(s.to_string()))
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceId::Numeric(id) => write!(f, "{id}"),
            DeviceId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for DeviceId {
    fn from(id: i64) -> Self {
        DeviceId::Numeric(id)
    }
}

/// A device as listed by the `devices` endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Server-side identifier
    pub id: DeviceId,
    /// Human-readable address (hostname or IP)
    pub address: String,
}

/// Content kind of a backup, derived from its type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    /// Textual configuration
    Text,
    /// Anything else
    Binary,
}

impl BackupKind {
    /// Classify a type tag; only `TEXT` (any case) is textual
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("TEXT") {
            BackupKind::Text
        } else {
            BackupKind::Binary
        }
    }

    /// File extension for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            BackupKind::Text => "txt",
            BackupKind::Binary => "bin",
        }
    }
}

/// One backup as returned by the backup listing endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Device the backup belongs to
    pub device_id: DeviceId,
    /// `validSince` in seconds since the epoch, if reported
    pub valid_since: Option<i64>,
    /// Base64-encoded payload, if reported
    pub payload: Option<String>,
    /// Raw type tag (empty when absent)
    pub type_tag: String,
}

impl BackupRecord {
    /// Content kind derived from the type tag
    pub fn kind(&self) -> BackupKind {
        BackupKind::from_tag(&self.type_tag)
    }

    /// Date string used in the backup file name
    pub fn date_label(&self) -> String {
        format_backup_date(self.valid_since)
    }
}

/// Render a `validSince` timestamp for file names
///
/// The timestamp is rendered in local time with [`BACKUP_DATE_FORMAT`]. Absent,
/// zero and out-of-range timestamps all yield [`UNKNOWN_DATE`].
///
/// # Examples
///
/// ```
/// use device_backup_exporter::format_backup_date;
///
/// assert_eq!(format_backup_date(None), "unknown");
/// assert_eq!(format_backup_date(Some(0)), "unknown");
/// assert_eq!(format_backup_date(Some(1_700_000_000)).len(), 19);
/// ```
pub fn format_backup_date(valid_since: Option<i64>) -> String {
    match valid_since {
        Some(ts) if ts != 0 => match Local.timestamp_opt(ts, 0).single() {
            Some(dt) => dt.format(BACKUP_DATE_FORMAT).to_string(),
            None => UNKNOWN_DATE.to_string(),
        },
        _ => UNKNOWN_DATE.to_string(),
    }
}
