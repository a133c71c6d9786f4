//! CPU readings from `/proc` and sysfs.
//!
//! Utilisation is the share of CPU time spent in active (non-idle) states
//! between two `/proc/stat` samples.

use crate::hwmon::{CpuTemperatures, find_cpu_hwmon};
use statscreen_core::{CpuReader, SensorError};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// CPU statistics from `/proc/stat`.
///
/// All values are in "jiffies" (clock ticks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuStats {
    /// Time spent in user mode (normal processes)
    pub user: u64,
    /// Time spent in user mode with low priority (nice)
    pub nice: u64,
    /// Time spent in system mode (kernel)
    pub system: u64,
    pub idle: u64,
    /// Time waiting for I/O to complete
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    /// Time stolen by virtualization
    pub steal: u64,
}

impl CpuStats {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.user + self.nice + self.system + self.idle + self.iowait + self.irq + self.softirq + self.steal
    }

    #[must_use]
    pub const fn active(&self) -> u64 {
        self.total() - self.idle - self.iowait
    }

    /// Usage in percent between `prev` and this reading.
    ///
    /// Returns 0.0 if no time has elapsed between readings.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn usage_percent(&self, prev: &Self) -> f64 {
        let total_diff = self.total().saturating_sub(prev.total());
        let active_diff = self.active().saturating_sub(prev.active());

        if total_diff == 0 {
            0.0
        } else {
            (active_diff as f64 / total_diff as f64 * 100.0).clamp(0.0, 100.0)
        }
    }

    /// Parse one `cpu` or `cpuN` line of `/proc/stat`.
    ///
    /// # Errors
    ///
    /// Returns a [`SensorError::Parse`] if the line format is invalid or
    /// contains non-numeric values.
    pub fn parse_from_proc_stat_line(line: &str) -> Result<Self, SensorError> {
        if !line.starts_with("cpu") {
            return Err(SensorError::parse("Line does not start with 'cpu'"));
        }

        let values = line
            .split_whitespace()
            .skip(1)
            .take(8)
            .map(str::parse)
            .collect::<Result<Vec<u64>, _>>()
            .map_err(|e| SensorError::parse_with_source("Failed to parse CPU statistics", e))?;

        if values.len() < 4 {
            return Err(SensorError::parse(format!(
                "Insufficient CPU statistics: expected at least 4, got {}",
                values.len()
            )));
        }

        let field = |index: usize| values.get(index).copied().unwrap_or(0);
        Ok(Self {
            user: values[0],
            nice: values[1],
            system: values[2],
            idle: values[3],
            iowait: field(4),
            irq: field(5),
            softirq: field(6),
            steal: field(7),
        })
    }

    /// Aggregate line of a whole `/proc/stat` file.
    pub fn from_proc_stat_content(content: &str) -> Result<Self, SensorError> {
        let first_line = content
            .lines()
            .next()
            .ok_or_else(|| SensorError::invalid_data("Empty /proc/stat file"))?;
        Self::parse_from_proc_stat_line(first_line)
    }
}

/// Fields of `/proc/cpuinfo` used by the reader.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuInfo {
    pub model_name: String,
    /// Number of logical processors
    pub core_count: usize,
    /// `cpu MHz` of each processor, in file order
    pub core_mhz: Vec<f64>,
}

impl CpuInfo {
    pub fn from_path(path: &Path) -> Result<Self, SensorError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse_cpuinfo_content(&content))
    }

    #[must_use]
    pub fn parse_cpuinfo_content(content: &str) -> Self {
        let mut model_name = None;
        let mut core_count = 0;
        let mut core_mhz = Vec::new();

        for line in content.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "model name" if model_name.is_none() => model_name = Some(value.to_owned()),
                "processor" => core_count += 1,
                "cpu MHz" => {
                    if let Ok(mhz) = value.parse() {
                        core_mhz.push(mhz);
                    }
                }
                _ => {}
            }
        }

        Self {
            model_name: model_name.unwrap_or_else(|| "Unknown CPU".to_owned()),
            core_count,
            core_mhz,
        }
    }
}

/// [`CpuReader`] for Linux.
#[derive(Debug)]
pub struct LinuxCpu {
    proc_root: PathBuf,
    sys_root: PathBuf,
    prev_stats: Option<CpuStats>,
    min_sample_interval: Duration,
    core_count: Option<usize>,
    /// `None` until the first lookup, then the lookup result
    hwmon: Option<Option<PathBuf>>,
}

impl LinuxCpu {
    /// Minimum interval between CPU samples to get meaningful data.
    const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
    /// Upper bound on the blocking first sample.
    const MAX_FIRST_SAMPLE: Duration = Duration::from_secs(1);

    #[must_use]
    pub fn new() -> Self {
        Self::with_roots("/proc", "/sys")
    }

    /// Read from directories laid out like `/proc` and `/sys`.
    #[must_use]
    pub fn with_roots(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
            prev_stats: None,
            min_sample_interval: Self::MIN_SAMPLE_INTERVAL,
            core_count: None,
            hwmon: None,
        }
    }

    #[must_use]
    pub const fn with_min_sample_interval(mut self, interval: Duration) -> Self {
        self.min_sample_interval = interval;
        self
    }

    fn read_proc_stat(&self) -> Result<CpuStats, SensorError> {
        let path = self.proc_root.join("stat");
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => SensorError::permission_denied(path.display().to_string()),
            _ => SensorError::Io(e),
        })?;
        CpuStats::from_proc_stat_content(&content)
    }

    fn sample_over(&self, interval: Duration) -> Result<(CpuStats, f64), SensorError> {
        let first = self.read_proc_stat()?;
        thread::sleep(interval);
        let second = self.read_proc_stat()?;
        Ok((second, second.usage_percent(&first)))
    }

    fn cpu_info(&self) -> Result<CpuInfo, SensorError> {
        CpuInfo::from_path(&self.proc_root.join("cpuinfo"))
    }

    fn core_count(&mut self) -> usize {
        if let Some(count) = self.core_count {
            return count;
        }
        let count = match self.cpu_info() {
            Ok(info) if info.core_count > 0 => info.core_count,
            _ => thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        };
        self.core_count = Some(count);
        count
    }

    /// `scaling_cur_freq` of every CPU that exposes one, in MHz.
    fn cpufreq_mhz(&self) -> Vec<f64> {
        let cpu_dir = self.sys_root.join("devices/system/cpu");
        let Ok(entries) = fs::read_dir(&cpu_dir) else {
            return Vec::new();
        };

        let mut cores: Vec<(usize, f64)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let core = name.to_str()?.strip_prefix("cpu")?.parse::<usize>().ok()?;
                let khz = fs::read_to_string(entry.path().join("cpufreq/scaling_cur_freq")).ok()?;
                let khz = khz.trim().parse::<f64>().ok()?;
                Some((core, khz / 1000.0))
            })
            .collect();
        cores.sort_by_key(|&(core, _)| core);
        cores.into_iter().map(|(_, mhz)| mhz).collect()
    }

    fn hwmon_dir(&mut self) -> Option<PathBuf> {
        let class_dir = self.sys_root.join("class/hwmon");
        self.hwmon
            .get_or_insert_with(|| find_cpu_hwmon(&class_dir))
            .clone()
    }

    fn temperatures(&mut self) -> Result<CpuTemperatures, SensorError> {
        let dir = self
            .hwmon_dir()
            .ok_or_else(|| SensorError::unavailable("No CPU hwmon device found"))?;
        CpuTemperatures::read(&dir)
    }
}

impl Default for LinuxCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuReader for LinuxCpu {
    fn percentage(&mut self, interval: Option<Duration>) -> Result<f64, SensorError> {
        let (latest, usage) = match self.prev_stats {
            Some(prev) => {
                let current = self.read_proc_stat()?;
                (current, current.usage_percent(&prev))
            }
            // First read: sleep and read again to get a delta
            None => {
                let window = interval
                    .filter(|interval| !interval.is_zero())
                    .map_or(self.min_sample_interval, |interval| {
                        interval.min(Self::MAX_FIRST_SAMPLE)
                    });
                self.sample_over(window)?
            }
        };
        self.prev_stats = Some(latest);
        Ok(usage)
    }

    fn frequency(&mut self) -> Result<f64, SensorError> {
        let cores = self.core_frequencies()?;
        if cores.is_empty() {
            return Err(SensorError::unavailable("CPU frequency not reported"));
        }
        #[allow(clippy::cast_precision_loss)]
        let count = cores.len() as f64;
        Ok(cores.iter().sum::<f64>() / count)
    }

    fn core_frequencies(&mut self) -> Result<Vec<f64>, SensorError> {
        let cpufreq = self.cpufreq_mhz();
        if !cpufreq.is_empty() {
            return Ok(cpufreq);
        }
        // No cpufreq driver (VMs, some ARM boards)
        Ok(self.cpu_info()?.core_mhz)
    }

    #[allow(clippy::cast_precision_loss)]
    fn load(&mut self) -> Result<(f64, f64, f64), SensorError> {
        let path = self.proc_root.join("loadavg");
        let content = fs::read_to_string(&path)?;
        let averages = content
            .split_whitespace()
            .take(3)
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SensorError::parse_with_source("Failed to parse /proc/loadavg", e))?;

        let &[one, five, fifteen] = averages.as_slice() else {
            return Err(SensorError::invalid_data_with_value(
                "Expected three load averages",
                content.trim(),
            ));
        };

        let cores = self.core_count() as f64;
        Ok((one / cores * 100.0, five / cores * 100.0, fifteen / cores * 100.0))
    }

    fn is_temperature_available(&mut self) -> bool {
        match self.temperatures() {
            Ok(temps) => temps.package.is_some(),
            Err(e) => {
                log::debug!("CPU temperature unavailable: {e}");
                false
            }
        }
    }

    fn temperature(&mut self) -> Result<f64, SensorError> {
        Ok(self.temperatures()?.package.unwrap_or(f64::NAN))
    }

    fn core_temperatures(&mut self) -> Result<Vec<f64>, SensorError> {
        Ok(self.temperatures()?.cores)
    }
}
