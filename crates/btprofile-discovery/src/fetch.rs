//! Fetch boundary: acquire a listing and parse it into devices

use btprofile_core::{parse_devices, Device};
use tracing::{error, info};

use crate::source::{DeviceSource, FetchError};

/// Acquire the listing from `source` and parse it
///
/// Acquisition failures are returned as errors. Parsing itself never fails;
/// malformed text simply yields fewer (or zero) devices.
pub async fn fetch_devices(source: &dyn DeviceSource) -> Result<Vec<Device>, FetchError> {
    info!(source = %source.describe(), "Fetching Bluetooth device listing");
    let raw = source.fetch_raw().await?;

    info!(bytes = raw.len(), "Listing acquired, parsing devices");
    let devices = parse_devices(&raw);

    info!(count = devices.len(), "Found Bluetooth devices");
    Ok(devices)
}

/// Like [`fetch_devices`], but any acquisition failure is logged and
/// reported as an empty list
pub async fn fetch_devices_or_empty(source: &dyn DeviceSource) -> Vec<Device> {
    match fetch_devices(source).await {
        Ok(devices) => devices,
        Err(e) => {
            error!(source = %source.describe(), error = %e, "Failed to fetch device listing");
            Vec::new()
        }
    }
}
