//! btprofile Discovery - Acquiring Bluetooth listings and turning them into devices
//!
//! This crate provides the sources a listing can come from:
//! - `system_profiler SPBluetoothDataType` run as a child process
//! - Captured listings read from disk
//! - In-memory text
//!
//! and the fetch boundary that hands the text to the core parser.

pub mod fetch;
pub mod source;

pub use fetch::{fetch_devices, fetch_devices_or_empty};
pub use source::{
    DeviceSource, FetchError, FileSource, StaticSource, SystemProfilerSource,
    DEFAULT_PROFILER_ARGS, DEFAULT_PROFILER_PROGRAM, DEFAULT_TIMEOUT_SECS,
};
