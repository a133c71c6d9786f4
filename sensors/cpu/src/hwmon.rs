//! CPU temperatures from `/sys/class/hwmon`.

use statscreen_core::SensorError;
use std::fs;
use std::path::{Path, PathBuf};

/// hwmon driver names that report CPU temperatures, best first.
const CPU_HWMON_NAMES: [&str; 4] = ["zenpower", "k10temp", "coretemp", "cpu_thermal"];

/// Find the hwmon device of the CPU under `class_dir` (normally
/// `/sys/class/hwmon`).
#[must_use]
pub fn find_cpu_hwmon(class_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(class_dir).ok()?;
    let mut best: Option<(usize, PathBuf)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(name) = fs::read_to_string(path.join("name")) else {
            continue;
        };
        let Some(rank) = CPU_HWMON_NAMES.iter().position(|known| *known == name.trim()) else {
            continue;
        };
        if best.as_ref().is_none_or(|(best_rank, _)| rank < *best_rank) {
            best = Some((rank, path));
        }
    }

    best.map(|(_, path)| {
        log::debug!("Using CPU hwmon device {}", path.display());
        path
    })
}

/// Temperatures of one hwmon device, in °C.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuTemperatures {
    /// Package (Intel) or die (AMD) temperature
    pub package: Option<f64>,
    /// Per-core temperatures ordered by core number
    pub cores: Vec<f64>,
}

impl CpuTemperatures {
    pub fn read(hwmon_dir: &Path) -> Result<Self, SensorError> {
        let mut package: Option<(u8, f64)> = None;
        let mut first_input = None;
        let mut cores = Vec::new();

        for entry in fs::read_dir(hwmon_dir)?.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(channel) = name.strip_prefix("temp").and_then(|n| n.strip_suffix("_input")) else {
                continue;
            };
            let Ok(channel) = channel.parse::<u32>() else {
                continue;
            };

            let celsius = read_millidegrees(&entry.path())?;
            let label = fs::read_to_string(hwmon_dir.join(format!("temp{channel}_label")))
                .map(|label| label.trim().to_owned())
                .unwrap_or_default();

            if let Some(core) = label.strip_prefix("Core ").and_then(|n| n.trim().parse::<usize>().ok()) {
                cores.push((core, celsius));
                continue;
            }

            if let Some(priority) = package_priority(&label) {
                if package.is_none_or(|(best, _)| priority < best) {
                    package = Some((priority, celsius));
                }
            }

            if first_input.is_none_or(|(lowest, _)| channel < lowest) {
                first_input = Some((channel, celsius));
            }
        }

        cores.sort_by_key(|&(core, _)| core);

        Ok(Self {
            package: package.or(first_input.map(|(_, c)| (u8::MAX, c))).map(|(_, celsius)| celsius),
            cores: cores.into_iter().map(|(_, celsius)| celsius).collect(),
        })
    }
}

fn package_priority(label: &str) -> Option<u8> {
    if label == "Tdie" {
        Some(0)
    } else if label.starts_with("Package id") || label == "Tctl" {
        Some(1)
    } else {
        None
    }
}

fn read_millidegrees(path: &Path) -> Result<f64, SensorError> {
    let content = fs::read_to_string(path)?;
    let millidegrees = content.trim().parse::<i64>().map_err(|e| {
        SensorError::parse_with_source(format!("Failed to parse {}", path.display()), e)
    })?;
    #[allow(clippy::cast_precision_loss)]
    let celsius = millidegrees as f64 / 1000.0;
    Ok(celsius)
}
