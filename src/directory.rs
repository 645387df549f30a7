//! Device id → address directory
//!
//! Built once per run by paging through the `devices` endpoint. It is only
//! used to name backup directories and files; in `all` mode its keys also
//! drive the per-device backup listing.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::fetcher::parser::ResponseParser;
use crate::fetcher::{BackupApi, FetcherResult, Paginator};
use crate::{Device, DeviceId};

/// Listing endpoint for devices
pub const DEVICES_ENDPOINT: &str = "devices";

/// In-memory map from device id to address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDirectory {
    devices: BTreeMap<DeviceId, String>,
}

/// Serializable directory entry for the `devices` command
#[derive(Debug, Serialize)]
pub struct DirectoryEntry<'a> {
    /// Device id as text
    pub id: String,
    /// Device address
    pub address: &'a str,
}

impl DeviceDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Page through `devices` until an empty page and collect every device
    /// that has both an id and an address
    pub async fn build(api: &dyn BackupApi) -> FetcherResult<Self> {
        info!("Getting device information");

        let mut directory = Self::new();
        let mut pages = Paginator::new(DEVICES_ENDPOINT);
        let mut skipped = 0usize;

        while let Some(records) = pages.next_page(api).await? {
            for record in &records {
                match ResponseParser::parse_device(record) {
                    Some(device) => directory.insert(device),
                    None => skipped += 1,
                }
            }
        }

        debug!(
            devices = directory.len(),
            skipped = skipped,
            pages = pages.pages_fetched(),
            "Device directory built"
        );
        Ok(directory)
    }

    /// Add or replace a device
    pub fn insert(&mut self, device: Device) {
        self.devices.insert(device.id, device.address);
    }

    /// Address of a known device
    pub fn address(&self, id: &DeviceId) -> Option<&str> {
        self.devices.get(id).map(|s| s.as_str())
    }

    /// Address of a device, or `device-<id>` when unknown
    pub fn address_or_placeholder(&self, id: &DeviceId) -> String {
        self.address(id)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("device-{id}"))
    }

    /// Device ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = &DeviceId> {
        self.devices.keys()
    }

    /// Entries in ascending id order
    pub fn entries(&self) -> Vec<DirectoryEntry<'_>> {
        self.devices
            .iter()
            .map(|(id, address)| DirectoryEntry {
                id: id.to_string(),
                address,
            })
            .collect()
    }

    /// Number of devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device is known
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<Device> for DeviceDirectory {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        let mut directory = Self::new();
        for device in iter {
            directory.insert(device);
        }
        directory
    }
}
