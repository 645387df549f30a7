//! Backup retrieval pipeline
//!
//! [`ExportContext`] holds everything one run needs: the validated
//! configuration, the API client, the device directory and the backup root.
//! It is built once and each stage borrows from it.
//!
//! # Counting
//!
//! [`ExportSummary::exported`] counts backup records *seen*: it is incremented
//! before the write outcome is known, so it includes backups that already
//! existed on disk and backups that failed to decode or write. The other
//! fields break that number down.

use std::path::{Path, PathBuf};

pub mod executor;

pub use executor::BackupExporter;

use crate::config::Config;
use crate::directory::DeviceDirectory;
use crate::fetcher::{BackupApi, FetcherError};
use crate::output::BackupWriter;

/// Default backup root, relative to the working directory
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// API request failed
    #[error(transparent)]
    Fetcher(#[from] FetcherError),

    /// Backup root could not be created
    #[error("IO error: {0}")]
    IoError(String),
}

/// Tallies for one export pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Records processed
    pub exported: usize,
    /// New files written
    pub written: usize,
    /// Records whose file already existed
    pub skipped_existing: usize,
    /// Records that failed to decode or write
    pub failed: usize,
}

/// State shared by the stages of one run
pub struct ExportContext<A> {
    config: Config,
    api: A,
    directory: DeviceDirectory,
    backup_root: PathBuf,
}

impl<A: BackupApi> ExportContext<A> {
    /// Create a context; the directory starts empty
    pub fn new(config: Config, api: A, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            api,
            directory: DeviceDirectory::new(),
            backup_root: backup_root.into(),
        }
    }

    /// Validated configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// API client
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Device directory (empty until [`load_directory`](Self::load_directory))
    pub fn directory(&self) -> &DeviceDirectory {
        &self.directory
    }

    /// Root of the backup tree
    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Build the device directory from the API
    pub async fn load_directory(&mut self) -> Result<&DeviceDirectory, FetcherError> {
        self.directory = DeviceDirectory::build(&self.api).await?;
        Ok(&self.directory)
    }

    /// Create the backup root if needed
    pub fn ensure_backup_root(&self) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.backup_root).map_err(|e| {
            ExportError::IoError(format!(
                "Failed to create backup directory {}: {}",
                self.backup_root.display(),
                e
            ))
        })
    }

    /// Export backups according to the configured backup mode
    pub async fn export_backups(&self) -> Result<ExportSummary, ExportError> {
        self.ensure_backup_root()?;
        let writer = BackupWriter::new(self.backup_root.clone());
        let summary = BackupExporter::new(&self.api, &self.directory, writer)
            .run(self.config.backup_mode)
            .await?;
        Ok(summary)
    }
}
