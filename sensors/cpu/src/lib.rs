//! CPU readings for statscreen.
//!
//! Utilisation comes from `/proc/stat` deltas, frequency from cpufreq (or
//! `/proc/cpuinfo`), load from `/proc/loadavg` and temperatures from the
//! CPU's hwmon device.
//!
//! # Examples
//!
//! ```rust,no_run
//! use statscreen_core::CpuReader;
//! use statscreen_cpu::LinuxCpu;
//!
//! let mut cpu = LinuxCpu::new();
//! println!("CPU usage: {:.1}%", cpu.percentage(None)?);
//! # Ok::<(), statscreen_core::SensorError>(())
//! ```

pub mod cpu;
mod hwmon;

pub use cpu::{CpuInfo, CpuStats, LinuxCpu};
pub use hwmon::{CpuTemperatures, find_cpu_hwmon};
