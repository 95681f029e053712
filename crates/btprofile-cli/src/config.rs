//! Configuration loading

use anyhow::Result;
use btprofile_discovery::{
    SystemProfilerSource, DEFAULT_PROFILER_ARGS, DEFAULT_PROFILER_PROGRAM, DEFAULT_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Listing command settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Program that prints the Bluetooth listing
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments passed to the program
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Give up on the program after this many seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_program() -> String {
    DEFAULT_PROFILER_PROGRAM.to_string()
}

fn default_args() -> Vec<String> {
    DEFAULT_PROFILER_ARGS.iter().map(|a| a.to_string()).collect()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per device
    #[default]
    Text,
    /// JSON array of device records
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Build the listing command described by this configuration
    pub fn to_source(&self) -> SystemProfilerSource {
        SystemProfilerSource::new(
            self.source.program.clone(),
            self.source.args.clone(),
            Duration::from_secs(self.source.timeout_secs),
        )
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file, refusing to replace an existing one
pub fn save_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "Configuration file {} already exists, not overwriting",
            path.display()
        );
    }

    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
