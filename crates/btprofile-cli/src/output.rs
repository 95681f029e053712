//! Rendering device lists for stdout

use anyhow::Result;
use btprofile_core::Device;

use crate::config::OutputFormat;

/// Render devices in the requested format
pub fn render(devices: &[Device], format: OutputFormat, pretty: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(devices)),
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(devices)?),
        OutputFormat::Json => Ok(serde_json::to_string(devices)?),
    }
}

fn render_text(devices: &[Device]) -> String {
    let mut out = format!("Found {} Bluetooth devices:", devices.len());
    for device in devices {
        out.push_str(&format!("\n  - {}", device.name));
        out.push_str(&format!("\n    Address: {}", device.address));
        if let Some(vendor_id) = &device.vendor_id {
            out.push_str(&format!("\n    Vendor ID: {}", vendor_id));
        }
    }
    out
}
