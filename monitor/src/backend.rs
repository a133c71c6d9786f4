//! Builds the [`SensorSet`] for the configured backend.

use statscreen_core::{GlobalConfig, SensorBackend, SensorSet};
use statscreen_cpu::LinuxCpu;
use statscreen_disk::LinuxDisk;
use statscreen_memory::LinuxMemory;
use statscreen_network::LinuxNet;
use statscreen_nvidia_gpu::NvidiaGpu;
use statscreen_stub::{RandomSensors, StaticSensors};
use std::path::Path;

const PROC_STAT_PATH: &str = "/proc/stat";

/// Backend `Auto` settles on.
#[must_use]
pub fn resolve(backend: SensorBackend) -> SensorBackend {
    resolve_with(backend, Path::new(PROC_STAT_PATH))
}

fn resolve_with(backend: SensorBackend, proc_stat: &Path) -> SensorBackend {
    match backend {
        SensorBackend::Auto if proc_stat.exists() => SensorBackend::Linux,
        SensorBackend::Auto => {
            log::warn!("{} not found, falling back to random sensors", proc_stat.display());
            SensorBackend::Stub
        }
        other => other,
    }
}

pub fn build(config: &GlobalConfig) -> SensorSet {
    let backend = resolve(config.hw_sensors);
    log::info!("Using {backend} sensors");

    match backend {
        SensorBackend::Linux | SensorBackend::Auto => SensorSet {
            cpu: Box::new(LinuxCpu::new()),
            gpu: Box::new(NvidiaGpu::new(config.gpu_id)),
            memory: Box::new(LinuxMemory::new()),
            disk: Box::new(LinuxDisk::new(&config.disk_path)),
            net: Box::new(LinuxNet::new()),
        },
        SensorBackend::Stub => RandomSensors::from_entropy().into_sensor_set(),
        SensorBackend::Static => StaticSensors.into_sensor_set(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let proc_stat = dir.path().join("stat");

        assert_eq!(resolve_with(SensorBackend::Auto, &proc_stat), SensorBackend::Stub);
        std::fs::write(&proc_stat, "cpu  1 2 3 4\n").unwrap();
        assert_eq!(resolve_with(SensorBackend::Auto, &proc_stat), SensorBackend::Linux);
        assert_eq!(resolve_with(SensorBackend::Static, &proc_stat), SensorBackend::Static);
    }

    #[test]
    fn test_build_static() {
        let config = GlobalConfig {
            hw_sensors: SensorBackend::Static,
            ..GlobalConfig::default()
        };
        let mut sensors = build(&config);
        assert_eq!(sensors.cpu.percentage(None).unwrap(), 50.0);
    }
}
