//! btprofile - Main entry point
//!
//! Lists Bluetooth devices by parsing `system_profiler SPBluetoothDataType`
//! output, either live or from a captured file.

mod config;
mod output;

use anyhow::Result;
use btprofile_discovery::{fetch_devices, fetch_devices_or_empty, DeviceSource, FileSource};
use clap::Parser;
use config::OutputFormat;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "btprofile")]
#[command(about = "List Bluetooth devices reported by system_profiler")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "btprofile.toml")]
    config: PathBuf,

    /// Parse a captured listing instead of running the command
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output format (overrides the configuration file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Exit with an error when the listing cannot be acquired
    #[arg(long)]
    strict: bool,

    /// Write a default configuration file to --config (if none exists) and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries the device list
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("btprofile v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    let config = config::load_config(&args.config)?;

    let source: Box<dyn DeviceSource> = match &args.input {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(config.to_source()),
    };

    let devices = if args.strict {
        fetch_devices(source.as_ref()).await?
    } else {
        fetch_devices_or_empty(source.as_ref()).await
    };

    let format = args.format.unwrap_or(config.output.format);
    println!("{}", output::render(&devices, format, config.output.pretty)?);

    Ok(())
}
