//! Backup file layout and writing
//!
//! - [`path`] computes the deterministic location of a backup file
//! - [`writer`] decodes a backup payload and writes it, never overwriting

pub mod path;
pub mod writer;

pub use path::BackupPathBuilder;
pub use writer::{BackupWriter, WriteOutcome};

/// Output errors
///
/// All of these are per-backup failures; the exporter logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Payload is not valid base64
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Backup carries no payload
    #[error("backup has no payload")]
    MissingPayload,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
