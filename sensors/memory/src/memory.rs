//! `/proc/meminfo` parsing.

use statscreen_core::{MemoryReader, SensorError};
use std::fs;
use std::path::{Path, PathBuf};

/// Memory statistics from `/proc/meminfo`.
///
/// All values are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    /// Free plus reclaimable memory
    pub mem_available: u64,
    pub mem_buffers: u64,
    pub mem_cached: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl MemoryInfo {
    #[must_use]
    pub const fn mem_used(&self) -> u64 {
        self.mem_total.saturating_sub(self.mem_available)
    }

    #[must_use]
    pub fn mem_used_percentage(&self) -> f64 {
        percentage(self.mem_used(), self.mem_total)
    }

    #[must_use]
    pub const fn swap_used(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_free)
    }

    #[must_use]
    pub fn swap_used_percentage(&self) -> f64 {
        percentage(self.swap_used(), self.swap_total)
    }

    pub fn from_path(path: &Path) -> Result<Self, SensorError> {
        let content = fs::read_to_string(path)?;
        Self::parse_meminfo_content(&content)
    }

    /// Parse meminfo content. Values are given in kB.
    pub fn parse_meminfo_content(content: &str) -> Result<Self, SensorError> {
        let mut info = Self {
            mem_total: 0,
            mem_free: 0,
            mem_available: 0,
            mem_buffers: 0,
            mem_cached: 0,
            swap_total: 0,
            swap_free: 0,
        };

        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            let key = key.trim_end_matches(':');
            let slot = match key {
                "MemTotal" => &mut info.mem_total,
                "MemFree" => &mut info.mem_free,
                "MemAvailable" => &mut info.mem_available,
                "Buffers" => &mut info.mem_buffers,
                "Cached" => &mut info.mem_cached,
                "SwapTotal" => &mut info.swap_total,
                "SwapFree" => &mut info.swap_free,
                _ => continue,
            };
            let kb = value.parse::<u64>().map_err(|e| {
                SensorError::parse_with_source(format!("Failed to parse {key} value"), e)
            })?;
            *slot = kb * 1024;
        }

        if info.mem_total == 0 {
            return Err(SensorError::invalid_data("meminfo has no MemTotal"));
        }

        // Kernels before 3.14 have no MemAvailable
        if info.mem_available == 0 {
            log::debug!("meminfo has no MemAvailable, estimating from MemFree, Buffers and Cached");
            info.mem_available = info.mem_free + info.mem_buffers + info.mem_cached;
        }

        Ok(info)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// [`MemoryReader`] backed by `/proc/meminfo`.
///
/// The file is re-read on every call so each value is current.
#[derive(Debug, Clone)]
pub struct LinuxMemory {
    path: PathBuf,
}

impl LinuxMemory {
    const PROC_MEMINFO_PATH: &'static str = "/proc/meminfo";

    #[must_use]
    pub fn new() -> Self {
        Self::with_path(Self::PROC_MEMINFO_PATH)
    }

    /// Read from another meminfo file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn info(&self) -> Result<MemoryInfo, SensorError> {
        MemoryInfo::from_path(&self.path)
    }
}

impl Default for LinuxMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryReader for LinuxMemory {
    fn swap_percent(&mut self) -> Result<f64, SensorError> {
        Ok(self.info()?.swap_used_percentage())
    }

    fn swap_used(&mut self) -> Result<u64, SensorError> {
        Ok(self.info()?.swap_used())
    }

    fn swap_free(&mut self) -> Result<u64, SensorError> {
        Ok(self.info()?.swap_free)
    }

    fn virtual_percent(&mut self) -> Result<f64, SensorError> {
        Ok(self.info()?.mem_used_percentage())
    }

    fn virtual_used(&mut self) -> Result<u64, SensorError> {
        Ok(self.info()?.mem_used())
    }

    fn virtual_free(&mut self) -> Result<u64, SensorError> {
        Ok(self.info()?.mem_available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = r#"
MemTotal:       16384000 kB
MemFree:         4096000 kB
MemAvailable:   12288000 kB
Buffers:         1024000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       8192000 kB
SwapFree:        6144000 kB
HugePages_Total:       0
"#;

    #[test]
    fn test_memory_info_parsing() {
        let info = MemoryInfo::parse_meminfo_content(MEMINFO).unwrap();

        assert_eq!(info.mem_total, 16_384_000 * 1024);
        assert_eq!(info.mem_free, 4_096_000 * 1024);
        assert_eq!(info.mem_available, 12_288_000 * 1024);
        assert_eq!(info.swap_total, 8_192_000 * 1024);
        assert_eq!(info.swap_free, 6_144_000 * 1024);
    }

    #[test]
    fn test_memory_calculations() {
        let info = MemoryInfo::parse_meminfo_content(MEMINFO).unwrap();

        assert_eq!(info.mem_used(), 4_096_000 * 1024);
        assert!((info.mem_used_percentage() - 25.0).abs() < 0.1);
        assert_eq!(info.swap_used(), 2_048_000 * 1024);
        assert!((info.swap_used_percentage() - 25.0).abs() < 0.1);
    }

    #[test]
    fn test_memory_info_fallback() {
        let content = r#"
MemTotal:       16384000 kB
MemFree:         4096000 kB
Buffers:         1024000 kB
Cached:          2048000 kB
SwapTotal:             0 kB
SwapFree:              0 kB
"#;

        let info = MemoryInfo::parse_meminfo_content(content).unwrap();
        assert_eq!(info.mem_available, (4_096_000 + 1_024_000 + 2_048_000) * 1024);
        // No swap configured
        assert_eq!(info.swap_used_percentage(), 0.0);
    }

    #[test]
    fn test_memory_info_rejects_garbage() {
        assert!(MemoryInfo::parse_meminfo_content("MemTotal: lots kB").is_err());
        assert!(MemoryInfo::parse_meminfo_content("").is_err());
    }

    #[test]
    fn test_linux_memory_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, MEMINFO).unwrap();

        let mut memory = LinuxMemory::with_path(&path);
        assert!((memory.virtual_percent().unwrap() - 25.0).abs() < 0.1);
        assert_eq!(memory.virtual_free().unwrap(), 12_288_000 * 1024);
        assert_eq!(memory.swap_used().unwrap(), 2_048_000 * 1024);
        assert_eq!(memory.swap_free().unwrap(), 6_144_000 * 1024);
    }
}
