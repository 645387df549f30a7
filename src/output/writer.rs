//! Backup file writer
//!
//! Decodes a base64 payload and writes it to its deterministic path through a
//! hidden staging file, so an interrupted write never leaves a truncated
//! backup behind. Existing files are never touched.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{BackupPathBuilder, OutputError, OutputResult};
use crate::BackupRecord;

/// What happened to one backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new file was written
    Written(PathBuf),
    /// A file already existed at the path
    Skipped(PathBuf),
}

/// Writes backups under a root directory
#[derive(Debug, Clone)]
pub struct BackupWriter {
    root_dir: PathBuf,
}

impl BackupWriter {
    /// Writer rooted at `root_dir`
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Root directory of the backup tree
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Write `record` for the device at `address`
    ///
    /// The device directory is created if needed. When the target file
    /// already exists nothing is decoded or written.
    ///
    /// # Errors
    /// Returns an [`OutputError`] when the payload is missing or not valid
    /// base64, or on any IO failure.
    pub fn write(&self, address: &str, record: &BackupRecord) -> OutputResult<WriteOutcome> {
        let builder = BackupPathBuilder::new(self.root_dir.clone(), &record.device_id, address)
            .with_date(record.date_label())
            .with_kind(record.kind());
        builder.ensure_directories()?;

        let path = builder.build();
        if path.exists() {
            debug!(path = %path.display(), "Backup already exported");
            return Ok(WriteOutcome::Skipped(path));
        }

        let data = decode_payload(record.payload.as_deref())?;

        let partial = partial_path(&path);
        match commit_staged(&partial, &path, |file| file.write_all(&data)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Ok(WriteOutcome::Skipped(path));
            }
            Err(e) => {
                return Err(OutputError::IoError(format!(
                    "Failed to write {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        debug!(path = %path.display(), bytes = data.len(), "Backup written");
        Ok(WriteOutcome::Written(path))
    }
}

/// Hidden staging file next to `path`: `.<name>.partial`
pub fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

/// Fill `partial` with `fill`, then move it to `path`
///
/// A backup only ever appears at `path` complete. On failure the staging
/// file is removed, so the next run retries. A leftover staging file from an
/// interrupted run is truncated and reused.
fn commit_staged<F>(partial: &Path, path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let result = File::create(partial).and_then(|mut file| {
        fill(&mut file)?;
        file.sync_all()?;
        drop(file);

        if path.exists() {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            ));
        }
        fs::rename(partial, path)
    });

    if result.is_err() {
        let _ = fs::remove_file(partial);
    }
    result
}

/// Decode a base64 payload, ignoring embedded whitespace
pub fn decode_payload(payload: Option<&str>) -> OutputResult<Vec<u8>> {
    let payload = payload.ok_or(OutputError::MissingPayload)?;
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| OutputError::DecodeError(e.to_string()))
}
