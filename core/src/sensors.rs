//! Sensor capability traits.
//!
//! Presenters only ever talk to these traits. Backends report unavailable
//! readings as NaN rather than as errors; `Err` is reserved for failures
//! that make the whole reading meaningless.

use crate::SensorError;
use std::time::Duration;

/// CPU readings.
pub trait CpuReader {
    /// Utilisation in percent since the previous call. `interval` is the
    /// caller's sampling period; backends that need two samples may block
    /// for up to that long on the first call.
    fn percentage(&mut self, interval: Option<Duration>) -> Result<f64, SensorError>;

    /// Current frequency in MHz.
    fn frequency(&mut self) -> Result<f64, SensorError>;

    /// Per-core frequencies in MHz, indexed by core number.
    fn core_frequencies(&mut self) -> Result<Vec<f64>, SensorError>;

    /// Average frequency of the listed cores, in MHz.
    fn frequency_cores(&mut self, cores: &[usize]) -> Result<f64, SensorError> {
        Ok(core_group_average(&self.core_frequencies()?, cores))
    }

    /// Load averages over 1, 5 and 15 minutes as a percentage of the
    /// available cores.
    fn load(&mut self) -> Result<(f64, f64, f64), SensorError>;

    fn is_temperature_available(&mut self) -> bool;

    /// Package temperature in °C.
    fn temperature(&mut self) -> Result<f64, SensorError>;

    /// Per-core temperatures in °C, indexed by core number.
    fn core_temperatures(&mut self) -> Result<Vec<f64>, SensorError>;

    fn temperature_cores(&mut self, cores: &[usize]) -> Result<f64, SensorError> {
        Ok(core_group_average(&self.core_temperatures()?, cores))
    }
}

/// One GPU sample. Fields the backend cannot read are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuStats {
    pub load: f64,
    pub memory_percentage: f64,
    pub memory_used_mb: f64,
    pub temperature: f64,
}

impl GpuStats {
    pub const UNAVAILABLE: Self = Self {
        load: f64::NAN,
        memory_percentage: f64::NAN,
        memory_used_mb: f64::NAN,
        temperature: f64::NAN,
    };
}

pub trait GpuReader {
    fn stats(&mut self) -> Result<GpuStats, SensorError>;

    fn is_available(&mut self) -> bool;
}

/// Memory readings. Sizes are in bytes.
pub trait MemoryReader {
    fn swap_percent(&mut self) -> Result<f64, SensorError>;
    fn swap_used(&mut self) -> Result<u64, SensorError>;
    fn swap_free(&mut self) -> Result<u64, SensorError>;
    fn virtual_percent(&mut self) -> Result<f64, SensorError>;
    fn virtual_used(&mut self) -> Result<u64, SensorError>;
    fn virtual_free(&mut self) -> Result<u64, SensorError>;
}

/// Usage of the monitored filesystem. Sizes are in bytes.
pub trait DiskReader {
    fn usage_percent(&mut self) -> Result<f64, SensorError>;
    fn used(&mut self) -> Result<u64, SensorError>;
    fn free(&mut self) -> Result<u64, SensorError>;
    fn total(&mut self) -> Result<u64, SensorError> {
        Ok(self.used()? + self.free()?)
    }
}

/// Traffic of one interface: rates in bytes/s, totals in bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetStats {
    pub upload_rate: f64,
    pub uploaded: f64,
    pub download_rate: f64,
    pub downloaded: f64,
}

impl NetStats {
    pub const UNAVAILABLE: Self = Self {
        upload_rate: f64::NAN,
        uploaded: f64::NAN,
        download_rate: f64::NAN,
        downloaded: f64::NAN,
    };

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.uploaded.is_nan() && self.downloaded.is_nan()
    }
}

pub trait NetReader {
    /// Traffic of `if_name`. Rates are computed over `interval_secs`; an
    /// interface without a previous sample reports [`NetStats::UNAVAILABLE`].
    fn stats(&mut self, if_name: &str, interval_secs: f64) -> Result<NetStats, SensorError>;
}

/// One backend of each kind.
pub struct SensorSet {
    pub cpu: Box<dyn CpuReader>,
    pub gpu: Box<dyn GpuReader>,
    pub memory: Box<dyn MemoryReader>,
    pub disk: Box<dyn DiskReader>,
    pub net: Box<dyn NetReader>,
}

impl std::fmt::Debug for SensorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSet").finish_non_exhaustive()
    }
}

/// Mean of `values` at `indices`. Indices past the end are ignored; when
/// none is valid the result is NaN.
#[must_use]
pub fn core_group_average(values: &[f64], indices: &[usize]) -> f64 {
    let selected: Vec<f64> = indices
        .iter()
        .filter_map(|&index| values.get(index).copied())
        .collect();
    if selected.is_empty() {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = selected.len() as f64;
    selected.iter().sum::<f64>() / count
}
