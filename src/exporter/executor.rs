//! Backup export executor
//!
//! Pages through either every device's backups (`all`) or the cross-device
//! latest listing (`latest`) and hands each record to the
//! [`BackupWriter`](crate::output::BackupWriter). A record that fails to
//! decode or write is logged and skipped; fetch failures stop the export.

use tracing::{debug, error, info, warn};

use super::ExportSummary;
use crate::config::BackupMode;
use crate::directory::DeviceDirectory;
use crate::fetcher::parser::ResponseParser;
use crate::fetcher::{BackupApi, FetcherResult, Paginator};
use crate::output::{BackupWriter, WriteOutcome};
use crate::{BackupRecord, DeviceId};

/// Listing endpoint for the most recent backup of every device
pub const LATEST_BACKUPS_ENDPOINT: &str = "devices/backups/latest";

/// Listing endpoint for every backup of one device
pub fn device_backups_endpoint(id: &DeviceId) -> String {
    format!("devices/{id}/backups")
}

/// Runs one export pass
pub struct BackupExporter<'a> {
    api: &'a dyn BackupApi,
    directory: &'a DeviceDirectory,
    writer: BackupWriter,
    summary: ExportSummary,
}

impl<'a> BackupExporter<'a> {
    /// Create an exporter writing through `writer`
    pub fn new(api: &'a dyn BackupApi, directory: &'a DeviceDirectory, writer: BackupWriter) -> Self {
        Self {
            api,
            directory,
            writer,
            summary: ExportSummary::default(),
        }
    }

    /// Export according to `mode` and return the tallies
    pub async fn run(mut self, mode: BackupMode) -> FetcherResult<ExportSummary> {
        match mode {
            BackupMode::All => {
                info!("Exporting all backups");
                self.export_all().await?;
            }
            BackupMode::Latest => {
                info!("Exporting latest backups");
                self.export_latest().await?;
            }
        }

        info!("{} backups exported", self.summary.exported);
        debug!(
            written = self.summary.written,
            skipped_existing = self.summary.skipped_existing,
            failed = self.summary.failed,
            "Export tallies"
        );
        Ok(self.summary)
    }

    async fn export_all(&mut self) -> FetcherResult<()> {
        let directory = self.directory;
        for device_id in directory.ids() {
            let mut pages = Paginator::new(device_backups_endpoint(device_id));
            while let Some(records) = pages.next_page(self.api).await? {
                for record in &records {
                    let backup = ResponseParser::parse_device_backup(device_id, record);
                    self.process(&backup);
                }
            }
        }
        Ok(())
    }

    async fn export_latest(&mut self) -> FetcherResult<()> {
        let mut pages = Paginator::new(LATEST_BACKUPS_ENDPOINT);
        while let Some(records) = pages.next_page(self.api).await? {
            for record in &records {
                match ResponseParser::parse_latest_backup(record) {
                    Some(backup) => self.process(&backup),
                    None => warn!("Skipping latest backup record without deviceId"),
                }
            }
        }
        Ok(())
    }

    /// Write one backup; failures are recorded, not returned
    fn process(&mut self, backup: &BackupRecord) {
        // Counts records seen, before the write outcome is known
        self.summary.exported += 1;

        let address = self.directory.address_or_placeholder(&backup.device_id);
        match self.writer.write(&address, backup) {
            Ok(WriteOutcome::Written(_)) => self.summary.written += 1,
            Ok(WriteOutcome::Skipped(_)) => self.summary.skipped_existing += 1,
            Err(e) => {
                self.summary.failed += 1;
                error!("Failed to save backup for device {}: {}", backup.device_id, e);
            }
        }
    }
}
