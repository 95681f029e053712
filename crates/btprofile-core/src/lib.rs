//! btprofile Core - Device records and Bluetooth listing parser
//!
//! This crate provides the offline half of btprofile:
//! - Device records extracted from a Bluetooth enumeration listing
//! - Vendor ID reinterpretation (hexadecimal token to decimal string)
//! - The indentation-driven parser that turns captured text into records

pub mod device;
pub mod parser;

pub use device::{Device, VendorId};
pub use parser::{indent_level, parse_devices, DeviceListParser, ParserState};
