//! Per-family presenters.
//!
//! A presenter reads one sensor family, formats the values the way the
//! display shows them and hands each sub-value to the [`Dispatcher`].

pub mod cpu;
pub mod date;
pub mod disk;
pub mod gpu;
pub mod memory;
pub mod net;

use crate::dispatch::Dispatcher;
use crate::sensors::SensorSet;
use crate::theme::MetricPoint;
use crate::DispatchError;
use chrono::Locale;
use std::fmt;
use std::time::Duration;

pub use net::NetInterfaces;

/// Settings presenters need beyond the theme.
#[derive(Debug, Clone)]
pub struct PresenterContext {
    pub interfaces: NetInterfaces,
    pub locale: Locale,
}

impl Default for PresenterContext {
    fn default() -> Self {
        Self {
            interfaces: NetInterfaces::default(),
            locale: Locale::POSIX,
        }
    }
}

/// Every periodic job the display runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presenter {
    CpuPercentage,
    CpuFrequency,
    CpuLoad,
    CpuTemperature,
    Gpu,
    Memory,
    Disk,
    Net,
    Date,
}

impl Presenter {
    pub const ALL: [Self; 9] = [
        Self::CpuPercentage,
        Self::CpuFrequency,
        Self::CpuLoad,
        Self::CpuTemperature,
        Self::Gpu,
        Self::Memory,
        Self::Disk,
        Self::Net,
        Self::Date,
    ];

    /// Theme node holding this job's `INTERVAL`.
    #[must_use]
    pub const fn interval_path(self) -> &'static [&'static str] {
        match self {
            Self::CpuPercentage => &["CPU", "PERCENTAGE"],
            Self::CpuFrequency => &["CPU", "FREQUENCY"],
            Self::CpuLoad => &["CPU", "LOAD"],
            Self::CpuTemperature => &["CPU", "TEMPERATURE"],
            Self::Gpu => &["GPU"],
            Self::Memory => &["MEMORY"],
            Self::Disk => &["DISK"],
            Self::Net => &["NET"],
            Self::Date => &["DATE"],
        }
    }

    /// Whether the backend can serve this job at all. Jobs that are not
    /// supported are never scheduled.
    pub fn is_supported(self, sensors: &mut SensorSet) -> bool {
        match self {
            Self::CpuTemperature => sensors.cpu.is_temperature_available(),
            Self::Gpu => sensors.gpu.is_available(),
            _ => true,
        }
    }

    /// Read and draw once.
    pub fn run(
        self,
        sensors: &mut SensorSet,
        out: &mut Dispatcher<'_>,
        ctx: &PresenterContext,
    ) -> Result<(), DispatchError> {
        match self {
            Self::CpuPercentage => cpu::percentage(sensors.cpu.as_mut(), out),
            Self::CpuFrequency => cpu::frequency(sensors.cpu.as_mut(), out),
            Self::CpuLoad => cpu::load(sensors.cpu.as_mut(), out),
            Self::CpuTemperature => cpu::temperature(sensors.cpu.as_mut(), out),
            Self::Gpu => gpu::stats(sensors.gpu.as_mut(), out).map(|_| ()),
            Self::Memory => memory::stats(sensors.memory.as_mut(), out),
            Self::Disk => disk::stats(sensors.disk.as_mut(), out),
            Self::Net => {
                let interval = net_rate_interval(out);
                net::stats(sensors.net.as_mut(), out, &ctx.interfaces, interval)
            }
            Self::Date => date::stats(out, &chrono::Local::now(), ctx.locale),
        }
    }
}

impl fmt::Display for Presenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CpuPercentage => "cpu-percentage",
            Self::CpuFrequency => "cpu-frequency",
            Self::CpuLoad => "cpu-load",
            Self::CpuTemperature => "cpu-temperature",
            Self::Gpu => "gpu",
            Self::Memory => "memory",
            Self::Disk => "disk",
            Self::Net => "net",
            Self::Date => "date",
        };
        f.write_str(name)
    }
}

/// Network rates are averaged over the CPU percentage period; themes that
/// do not sample the CPU fall back to the network's own period.
fn net_rate_interval(out: &Dispatcher<'_>) -> f64 {
    let theme = out.theme();
    theme
        .interval(Presenter::CpuPercentage.interval_path())
        .or_else(|| theme.interval(Presenter::Net.interval_path()))
        .map_or(1.0, |interval: Duration| interval.as_secs_f64())
}

/// NaN readings are skipped with a warning.
pub(crate) fn is_available(point: &MetricPoint<'_>, value: f64) -> bool {
    if value.is_nan() {
        log::warn!("{point}: reading not available on this system");
        false
    } else {
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixed readers shared by the presenter tests.

    use crate::sensors::*;
    use crate::SensorError;
    use std::time::Duration;

    #[derive(Debug, Default)]
    pub struct FakeCpu {
        pub percentage: f64,
        pub frequency: f64,
        pub cores: Vec<f64>,
        pub core_temps: Vec<f64>,
        pub load: (f64, f64, f64),
        pub temperature: Option<f64>,
    }

    impl CpuReader for FakeCpu {
        fn percentage(&mut self, _interval: Option<Duration>) -> Result<f64, SensorError> {
            Ok(self.percentage)
        }
        fn frequency(&mut self) -> Result<f64, SensorError> {
            Ok(self.frequency)
        }
        fn core_frequencies(&mut self) -> Result<Vec<f64>, SensorError> {
            Ok(self.cores.clone())
        }
        fn load(&mut self) -> Result<(f64, f64, f64), SensorError> {
            Ok(self.load)
        }
        fn is_temperature_available(&mut self) -> bool {
            self.temperature.is_some()
        }
        fn temperature(&mut self) -> Result<f64, SensorError> {
            self.temperature
                .ok_or_else(|| SensorError::unavailable("no temperature sensor"))
        }
        fn core_temperatures(&mut self) -> Result<Vec<f64>, SensorError> {
            Ok(self.core_temps.clone())
        }
    }

    pub struct FakeGpu(pub GpuStats);

    impl GpuReader for FakeGpu {
        fn stats(&mut self) -> Result<GpuStats, SensorError> {
            Ok(self.0)
        }
        fn is_available(&mut self) -> bool {
            true
        }
    }

    pub struct FakeMemory;

    impl MemoryReader for FakeMemory {
        fn swap_percent(&mut self) -> Result<f64, SensorError> {
            Ok(12.5)
        }
        fn swap_used(&mut self) -> Result<u64, SensorError> {
            Ok(1_500_000_000)
        }
        fn swap_free(&mut self) -> Result<u64, SensorError> {
            Ok(10_500_000_000)
        }
        fn virtual_percent(&mut self) -> Result<f64, SensorError> {
            Ok(63.9)
        }
        fn virtual_used(&mut self) -> Result<u64, SensorError> {
            Ok(10_240_000_000)
        }
        fn virtual_free(&mut self) -> Result<u64, SensorError> {
            Ok(5_760_000_000)
        }
    }

    pub struct FakeDisk;

    impl DiskReader for FakeDisk {
        fn usage_percent(&mut self) -> Result<f64, SensorError> {
            Ok(41.7)
        }
        fn used(&mut self) -> Result<u64, SensorError> {
            Ok(200_000_000_000)
        }
        fn free(&mut self) -> Result<u64, SensorError> {
            Ok(280_000_000_000)
        }
    }

    pub struct FakeNet;

    impl NetReader for FakeNet {
        fn stats(&mut self, if_name: &str, interval_secs: f64) -> Result<NetStats, SensorError> {
            if if_name != "eth0" {
                return Ok(NetStats::UNAVAILABLE);
            }
            Ok(NetStats {
                upload_rate: 2048.0 / interval_secs,
                uploaded: 1_073_741_824.0,
                download_rate: 512.0,
                downloaded: 5_368_709_120.0,
            })
        }
    }

    pub fn sensor_set(cpu: FakeCpu) -> SensorSet {
        SensorSet {
            cpu: Box::new(cpu),
            gpu: Box::new(FakeGpu(GpuStats {
                load: 30.0,
                memory_percentage: 25.0,
                memory_used_mb: 2048.0,
                temperature: 55.0,
            })),
            memory: Box::new(FakeMemory),
            disk: Box::new(FakeDisk),
            net: Box::new(FakeNet),
        }
    }
}
