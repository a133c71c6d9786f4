//! Disk usage through `df`.

use statscreen_core::{DiskReader, SensorError};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors specific to disk monitoring operations.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("Command execution failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Usage calculation failed for {path}: {reason}")]
    UsageCalculation { path: String, reason: String },
}

impl From<DiskError> for SensorError {
    fn from(err: DiskError) -> Self {
        match err {
            DiskError::CommandFailed { source, .. } => SensorError::Io(source),
            DiskError::UsageCalculation { path, reason } => {
                SensorError::invalid_data_with_value(reason, path)
            }
        }
    }
}

/// One `df` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskInfo {
    /// Device identifier (e.g., /dev/sda1)
    pub device: String,
    /// Filesystem type (e.g., ext4, btrfs)
    pub filesystem: String,
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl DiskInfo {
    /// Used share of the space visible to unprivileged users, as `df`
    /// reports it: reserved blocks count as neither used nor available.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn used_percentage(&self) -> f64 {
        let visible = self.used + self.available;
        if visible == 0 {
            0.0
        } else {
            self.used as f64 / visible as f64 * 100.0
        }
    }
}

/// Parse `df -B1 -T -P` output.
///
/// Columns: Filesystem Type 1-blocks Used Available Capacity Mounted
pub fn parse_df_output(output: &str) -> Result<DiskInfo, SensorError> {
    for line in output.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            continue;
        }

        let number = |index: usize, what: &str| {
            parts[index]
                .parse::<u64>()
                .map_err(|e| SensorError::parse_with_source(format!("Failed to parse {what}"), e))
        };

        return Ok(DiskInfo {
            device: parts[0].to_owned(),
            filesystem: parts[1].to_owned(),
            total: number(2, "total space")?,
            used: number(3, "used space")?,
            available: number(4, "available space")?,
        });
    }

    Err(SensorError::parse("Could not parse df output"))
}

/// [`DiskReader`] for the filesystem holding `path`.
///
/// The disk presenter asks for several values in a row; one `df` run serves
/// them all for `max_age`.
#[derive(Debug)]
pub struct LinuxDisk {
    path: PathBuf,
    max_age: Duration,
    cached: Option<(DiskInfo, Instant)>,
}

impl LinuxDisk {
    const DEFAULT_MAX_AGE: Duration = Duration::from_secs(1);

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: Self::DEFAULT_MAX_AGE,
            cached: None,
        }
    }

    #[must_use]
    pub const fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn info(&mut self) -> Result<DiskInfo, SensorError> {
        if let Some((info, at)) = &self.cached {
            if at.elapsed() < self.max_age {
                return Ok(info.clone());
            }
        }

        let info = self.fetch()?;
        self.cached = Some((info.clone(), Instant::now()));
        Ok(info)
    }

    fn fetch(&self) -> Result<DiskInfo, SensorError> {
        let path = self.path.to_string_lossy();
        let output = Command::new("df")
            .args(["-B1", "-T", "-P"])
            .arg(&*path)
            .output()
            .map_err(|source| DiskError::CommandFailed {
                command: "df".to_owned(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiskError::UsageCalculation {
                path: path.into_owned(),
                reason: format!("df command failed: {}", stderr.trim()),
            }
            .into());
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| SensorError::parse_with_source("Invalid UTF-8 in df output", e))?;
        let info = parse_df_output(&stdout)?;
        log::trace!("{}: {} {} used {}/{}", path, info.device, info.filesystem, info.used, info.total);
        Ok(info)
    }
}

impl DiskReader for LinuxDisk {
    fn usage_percent(&mut self) -> Result<f64, SensorError> {
        Ok(self.info()?.used_percentage())
    }

    fn used(&mut self) -> Result<u64, SensorError> {
        Ok(self.info()?.used)
    }

    fn free(&mut self) -> Result<u64, SensorError> {
        Ok(self.info()?.available)
    }
}
