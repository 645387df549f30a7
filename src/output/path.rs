//! Deterministic path generation for backup files
//!
//! Layout: `{root}/{address} - {id}/Backup {address} {date} {id}.{ext}`
//!
//! # Usage Example
//!
//! ```rust
//! use device_backup_exporter::output::BackupPathBuilder;
//! use device_backup_exporter::{BackupKind, DeviceId};
//! use std::path::PathBuf;
//!
//! let path = BackupPathBuilder::new(PathBuf::from("backups"), &DeviceId::from(7), "core-sw1")
//!     .with_date("2023-11-14-22:13:20")
//!     .with_kind(BackupKind::Text)
//!     .build();
//!
//! assert_eq!(
//!     path,
//!     PathBuf::from("backups/core-sw1 - 7/Backup core-sw1 2023-11-14-22:13:20 7.txt")
//! );
//! ```

use std::path::PathBuf;

use super::{OutputError, OutputResult};
use crate::{BackupKind, DeviceId, UNKNOWN_DATE};

/// Path builder for one backup file
#[derive(Debug, Clone)]
pub struct BackupPathBuilder {
    root_dir: PathBuf,
    device_id: String,
    address: String,
    date: String,
    kind: BackupKind,
}

impl BackupPathBuilder {
    /// Create a builder for a device's backup
    ///
    /// # Security
    ///
    /// The address comes from the server and is sanitized so it cannot leave
    /// the root directory: `..` becomes `__` and path separators become `_`.
    pub fn new(root_dir: PathBuf, device_id: &DeviceId, address: &str) -> Self {
        Self {
            root_dir,
            device_id: sanitize_component(&device_id.to_string()),
            address: sanitize_component(address),
            date: UNKNOWN_DATE.to_string(),
            kind: BackupKind::Binary,
        }
    }

    /// Set the formatted date
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Set the content kind (selects the extension)
    pub fn with_kind(mut self, kind: BackupKind) -> Self {
        self.kind = kind;
        self
    }

    /// Per-device directory
    pub fn device_dir(&self) -> PathBuf {
        self.root_dir
            .join(format!("{} - {}", self.address, self.device_id))
    }

    /// File name within the device directory
    pub fn file_name(&self) -> String {
        format!(
            "Backup {} {} {}.{}",
            self.address,
            self.date,
            self.device_id,
            self.kind.extension()
        )
    }

    /// Complete file path
    pub fn build(&self) -> PathBuf {
        self.device_dir().join(self.file_name())
    }

    /// Create the device directory and any missing parents
    pub fn ensure_directories(&self) -> OutputResult<()> {
        let dir_path = self.device_dir();
        std::fs::create_dir_all(&dir_path).map_err(|e| {
            OutputError::IoError(format!(
                "Failed to create directory {}: {}",
                dir_path.display(),
                e
            ))
        })
    }
}

/// Sanitize a server-provided name for use as a single path component
fn sanitize_component(name: &str) -> String {
    name.replace("..", "__").replace(['/', '\\'], "_")
}
