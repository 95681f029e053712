//! Sources of raw Bluetooth listing text

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, trace};

/// Program that prints the Bluetooth listing on macOS
pub const DEFAULT_PROFILER_PROGRAM: &str = "system_profiler";

/// Data type argument selecting the Bluetooth report
pub const DEFAULT_PROFILER_ARGS: &[&str] = &["SPBluetoothDataType"];

/// Default time limit for the listing command, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Failed to read listing from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can produce the raw listing text
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// Acquire the full listing as one text blob
    async fn fetch_raw(&self) -> Result<String, FetchError>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Runs a listing command (by default `system_profiler SPBluetoothDataType`)
#[derive(Debug, Clone)]
pub struct SystemProfilerSource {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for SystemProfilerSource {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROFILER_PROGRAM.to_string(),
            args: DEFAULT_PROFILER_ARGS.iter().map(|a| a.to_string()).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SystemProfilerSource {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl DeviceSource for SystemProfilerSource {
    async fn fetch_raw(&self) -> Result<String, FetchError> {
        debug!(program = %self.program, args = ?self.args, "Running listing command");

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                })
            }
        };

        if !output.status.success() {
            return Err(FetchError::CommandFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!(bytes = stdout.len(), "Listing command output");
        Ok(stdout)
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Reads a previously captured listing from disk
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DeviceSource for FileSource {
    async fn fetch_raw(&self) -> Result<String, FetchError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FetchError::Read {
                path: self.path.clone(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Listing text already held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub String);

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

#[async_trait]
impl DeviceSource for StaticSource {
    async fn fetch_raw(&self) -> Result<String, FetchError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "in-memory listing".to_string()
    }
}
