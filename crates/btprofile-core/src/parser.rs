//! Parser for Bluetooth enumeration listings
//!
//! The input is the text printed by `system_profiler SPBluetoothDataType`:
//! indentation-delimited blocks where `Connected:` / `Not Connected:` open a
//! device section, level-2 lines ending in `:` name a device, and level-3
//! `Key: value` lines carry its attributes.
//!
//! ```text
//! Connected:
//!         Mouse:
//!             Address: 11-22-33-44-55-66
//!             Vendor ID: 0x004c (Apple)
//! ```
//!
//! Anything that does not fit that shape is skipped. A block is only emitted
//! once it has both a name and an address.

use crate::device::{Device, VendorId};
use tracing::{debug, trace};

/// Whitespace characters per indent level (tabs count as one)
pub const INDENT_WIDTH: usize = 4;

/// Indent level of device header lines
pub const DEVICE_LEVEL: usize = 2;

/// Indent level of device attribute lines
pub const ATTRIBUTE_LEVEL: usize = 3;

/// Lines that switch the parser into device sections
const SECTION_HEADERS: [&str; 2] = ["Connected:", "Not Connected:"];

const ADDRESS_KEY: &str = "Address";
const VENDOR_ID_KEY: &str = "Vendor ID";

/// Whitespace for indentation and trimming; includes the byte order mark
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Nesting depth of a line: leading whitespace characters divided by 4
pub fn indent_level(line: &str) -> usize {
    line.chars().take_while(|&c| is_blank(c)).count() / INDENT_WIDTH
}

/// Parse a full listing into devices, in input order
pub fn parse_devices(raw: &str) -> Vec<Device> {
    let mut parser = DeviceListParser::new();
    for line in raw.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Device block under construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialDevice {
    pub name: String,
    /// Empty until an `Address:` line with a value is seen
    pub address: String,
    pub vendor_id: Option<VendorId>,
}

impl PartialDevice {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn apply_attribute(&mut self, line: &str) {
        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key, value.trim_matches(is_blank)),
            None => (line, ""),
        };

        match key.trim_matches(is_blank) {
            ADDRESS_KEY => {
                trace!(device = %self.name, address = %value, "Address");
                self.address = value.to_string();
            }
            VENDOR_ID_KEY => {
                let vendor_id = VendorId::from_attribute_value(value);
                trace!(device = %self.name, raw = %value, vendor_id = %vendor_id, "Vendor ID");
                self.vendor_id = Some(vendor_id);
            }
            _ => {}
        }
    }

    /// Convert into a record if both name and address are present
    pub fn into_device(self) -> Option<Device> {
        if self.name.is_empty() || self.address.is_empty() {
            return None;
        }
        Some(Device {
            name: self.name,
            address: self.address,
            vendor_id: self.vendor_id,
        })
    }
}

/// Where the parser is within the listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParserState {
    /// No section header seen yet; every line is ignored
    #[default]
    AwaitingSection,
    /// Inside a section with no named device open
    AwaitingDevice,
    /// Collecting attributes for a named device
    InDevice(PartialDevice),
}

/// Line-at-a-time state machine behind [`parse_devices`]
#[derive(Debug, Default)]
pub struct DeviceListParser {
    state: ParserState,
    devices: Vec<Device>,
}

impl DeviceListParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Devices closed so far (excludes the one currently open)
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Advance the state machine by one input line
    pub fn feed_line(&mut self, line: &str) {
        let level = indent_level(line);
        let trimmed = line.trim_matches(is_blank);
        if trimmed.is_empty() {
            return;
        }

        if SECTION_HEADERS.contains(&trimmed) {
            trace!(section = %trimmed, "Section header");
            // An open device stays open across section headers
            if self.state == ParserState::AwaitingSection {
                self.state = ParserState::AwaitingDevice;
            }
            return;
        }

        if self.state == ParserState::AwaitingSection {
            return;
        }

        if level == DEVICE_LEVEL && trimmed.ends_with(':') {
            self.open_device(trimmed);
        } else if level == ATTRIBUTE_LEVEL {
            if let ParserState::InDevice(partial) = &mut self.state {
                partial.apply_attribute(trimmed);
            }
        }
    }

    /// Close the last open device and return everything collected
    pub fn finish(mut self) -> Vec<Device> {
        self.close_current();
        debug!(count = self.devices.len(), "Parsed Bluetooth device listing");
        self.devices
    }

    fn open_device(&mut self, header: &str) {
        self.close_current();

        let name = header.strip_suffix(':').unwrap_or(header).trim_matches(is_blank);
        if name.is_empty() {
            trace!("Device header without a name");
            return;
        }

        trace!(device = %name, "Device header");
        self.state = ParserState::InDevice(PartialDevice::new(name));
    }

    fn close_current(&mut self) {
        if self.state == ParserState::AwaitingSection {
            return;
        }

        let previous = std::mem::replace(&mut self.state, ParserState::AwaitingDevice);
        if let ParserState::InDevice(partial) = previous {
            let name = partial.name.clone();
            match partial.into_device() {
                Some(device) => self.devices.push(device),
                None => trace!(device = %name, "Dropping device without address"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Connected:
        Mouse:
            Address: 11-22-33-44-55-66
            Vendor ID: 0x004c (Apple)
Not Connected:
        Keyboard:
            Address: aa-bb-cc-dd-ee-ff
";

    #[test]
    fn test_indent_level() {
        assert_eq!(indent_level("Connected:"), 0);
        assert_eq!(indent_level("   x"), 0);
        assert_eq!(indent_level("    x"), 1);
        assert_eq!(indent_level("        x"), 2);
        assert_eq!(indent_level("           x"), 2);
        assert_eq!(indent_level("            x"), 3);
    }

    #[test]
    fn test_indent_level_counts_tabs_as_one() {
        assert_eq!(indent_level("\tx"), 0);
        assert_eq!(indent_level("\t\t\t\tx"), 1);
        assert_eq!(indent_level("\t\t\t\t\t\t\t\tx"), 2);
    }

    #[test]
    fn test_parse_sample() {
        let devices = parse_devices(SAMPLE);
        assert_eq!(
            devices,
            vec![
                Device::new("Mouse", "11-22-33-44-55-66").with_vendor_id(VendorId::Known(76)),
                Device::new("Keyboard", "aa-bb-cc-dd-ee-ff"),
            ]
        );
    }

    #[test]
    fn test_no_section_header_yields_nothing() {
        let input = "\
        Mouse:
            Address: 11-22-33-44-55-66
";
        assert!(parse_devices(input).is_empty());
        assert!(parse_devices("").is_empty());
    }

    #[test]
    fn test_device_without_address_is_dropped() {
        let input = "\
Connected:
        Headset:
            Vendor ID: 0x004c
            Product ID: 0x2014
        Mouse:
            Address: 11-22
";
        let devices = parse_devices(input);
        assert_eq!(devices, vec![Device::new("Mouse", "11-22")]);
    }

    #[test]
    fn test_trailing_device_without_address_is_dropped() {
        let input = "\
Connected:
        Mouse:
            Address: 11-22
        Headset:
            Vendor ID: 0x004c
";
        assert_eq!(parse_devices(input), vec![Device::new("Mouse", "11-22")]);
    }

    #[test]
    fn test_address_keeps_extra_colons() {
        let input = "\
Connected:
        AirPods:
            Address: 70:F9:4A:12:34:56
";
        let devices = parse_devices(input);
        assert_eq!(devices[0].address, "70:F9:4A:12:34:56");
    }

    #[test]
    fn test_header_name_is_trimmed() {
        let input = "Connected:\n        Magic Mouse  :\n            Address: 11\n";
        assert_eq!(parse_devices(input)[0].name, "Magic Mouse");
    }

    #[test]
    fn test_headers_at_other_levels_are_ignored() {
        let input = "\
Connected:
    Level One:
            Address: 11
            Level Three:
                Address: 22
";
        assert!(parse_devices(input).is_empty());
    }

    #[test]
    fn test_deeper_attributes_are_ignored() {
        let input = "\
Connected:
        Mouse:
            Address: 11
                Address: 99
                Vendor ID: 0x0001
";
        assert_eq!(parse_devices(input), vec![Device::new("Mouse", "11")]);
    }

    #[test]
    fn test_unknown_keys_and_lines_without_colon_are_ignored() {
        let input = "\
Connected:
        Mouse:
            Firmware Version: 1.2.3
            Battery Level
            Address: 11
";
        assert_eq!(parse_devices(input), vec![Device::new("Mouse", "11")]);
    }

    #[test]
    fn test_empty_address_counts_as_missing() {
        let input = "\
Connected:
        Mouse:
            Address: 11
            Address:
";
        assert!(parse_devices(input).is_empty());
    }

    #[test]
    fn test_empty_header_closes_previous_and_drops_attributes() {
        let input = "\
Connected:
        Mouse:
            Address: 11
        :
            Address: 22
";
        assert_eq!(parse_devices(input), vec![Device::new("Mouse", "11")]);
    }

    #[test]
    fn test_unparseable_vendor_id_keeps_device() {
        let input = "\
Connected:
        Gadget:
            Address: 11
            Vendor ID: (unknown)
";
        let devices = parse_devices(input);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].vendor_id.as_ref().unwrap().to_string(), "NaN");
    }

    #[test]
    fn test_section_header_does_not_close_open_device() {
        let input = "\
Connected:
        Mouse:
Not Connected:
            Address: 11
";
        assert_eq!(parse_devices(input), vec![Device::new("Mouse", "11")]);
    }

    #[test]
    fn test_blank_lines_do_not_change_state() {
        let input = "Connected:\n\n        Mouse:\n   \n            Address: 11\n\n";
        assert_eq!(parse_devices(input), vec![Device::new("Mouse", "11")]);
    }

    #[test]
    fn test_byte_order_mark_is_whitespace() {
        let input = format!("\u{feff}{}", SAMPLE);
        assert_eq!(parse_devices(&input).len(), 2);
        assert_eq!(indent_level("\u{feff}   x"), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = SAMPLE.replace('\n', "\r\n");
        assert_eq!(parse_devices(&input).len(), 2);
    }

    #[test]
    fn test_state_transitions() {
        let mut parser = DeviceListParser::new();
        assert_eq!(parser.state(), &ParserState::AwaitingSection);

        parser.feed_line("        Ignored:");
        assert_eq!(parser.state(), &ParserState::AwaitingSection);

        parser.feed_line("Connected:");
        assert_eq!(parser.state(), &ParserState::AwaitingDevice);

        parser.feed_line("        Mouse:");
        assert!(matches!(parser.state(), ParserState::InDevice(p) if p.name == "Mouse"));

        parser.feed_line("            Address: 11");
        parser.feed_line("        Keyboard:");
        assert_eq!(parser.devices(), &[Device::new("Mouse", "11")]);

        let devices = parser.finish();
        assert_eq!(devices.len(), 1);
    }
}
