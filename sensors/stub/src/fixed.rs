use statscreen_core::{
    CpuReader, DiskReader, GpuReader, GpuStats, MemoryReader, NetReader, NetStats, SensorError,
    SensorSet,
};
use std::time::Duration;

/// Fixed readings for every sensor family.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSensors;

impl StaticSensors {
    #[must_use]
    pub fn into_sensor_set(self) -> SensorSet {
        SensorSet {
            cpu: Box::new(StaticCpu),
            gpu: Box::new(StaticGpu),
            memory: Box::new(StaticMemory),
            disk: Box::new(StaticDisk),
            net: Box::new(StaticNet),
        }
    }
}

struct StaticCpu;

impl StaticCpu {
    const CORE_FREQUENCIES: [f64; 4] = [2400.0, 2600.0, 2800.0, 3000.0];
    const CORE_TEMPERATURES: [f64; 4] = [48.0, 50.0, 52.0, 54.0];
}

impl CpuReader for StaticCpu {
    fn percentage(&mut self, _interval: Option<Duration>) -> Result<f64, SensorError> {
        Ok(50.0)
    }

    fn frequency(&mut self) -> Result<f64, SensorError> {
        Ok(2700.0)
    }

    fn core_frequencies(&mut self) -> Result<Vec<f64>, SensorError> {
        Ok(Self::CORE_FREQUENCIES.to_vec())
    }

    fn load(&mut self) -> Result<(f64, f64, f64), SensorError> {
        Ok((25.0, 20.0, 15.0))
    }

    fn is_temperature_available(&mut self) -> bool {
        true
    }

    fn temperature(&mut self) -> Result<f64, SensorError> {
        Ok(55.0)
    }

    fn core_temperatures(&mut self) -> Result<Vec<f64>, SensorError> {
        Ok(Self::CORE_TEMPERATURES.to_vec())
    }
}

struct StaticGpu;

impl GpuReader for StaticGpu {
    fn stats(&mut self) -> Result<GpuStats, SensorError> {
        Ok(GpuStats {
            load: 30.0,
            memory_percentage: 25.0,
            memory_used_mb: 2048.0,
            temperature: 60.0,
        })
    }

    fn is_available(&mut self) -> bool {
        true
    }
}

struct StaticMemory;

impl MemoryReader for StaticMemory {
    fn swap_percent(&mut self) -> Result<f64, SensorError> {
        Ok(10.0)
    }

    fn swap_used(&mut self) -> Result<u64, SensorError> {
        Ok(800_000_000)
    }

    fn swap_free(&mut self) -> Result<u64, SensorError> {
        Ok(7_200_000_000)
    }

    fn virtual_percent(&mut self) -> Result<f64, SensorError> {
        Ok(40.0)
    }

    fn virtual_used(&mut self) -> Result<u64, SensorError> {
        Ok(6_400_000_000)
    }

    fn virtual_free(&mut self) -> Result<u64, SensorError> {
        Ok(9_600_000_000)
    }
}

struct StaticDisk;

impl DiskReader for StaticDisk {
    fn usage_percent(&mut self) -> Result<f64, SensorError> {
        Ok(60.0)
    }

    fn used(&mut self) -> Result<u64, SensorError> {
        Ok(300_000_000_000)
    }

    fn free(&mut self) -> Result<u64, SensorError> {
        Ok(200_000_000_000)
    }
}

struct StaticNet;

impl NetReader for StaticNet {
    fn stats(&mut self, _if_name: &str, _interval_secs: f64) -> Result<NetStats, SensorError> {
        Ok(NetStats {
            upload_rate: 128.0 * 1024.0,
            uploaded: 512.0 * 1024.0 * 1024.0,
            download_rate: 2.0 * 1024.0 * 1024.0,
            downloaded: 4.0 * 1024.0 * 1024.0 * 1024.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_values_repeat() {
        let mut sensors = StaticSensors.into_sensor_set();
        assert_eq!(sensors.cpu.percentage(None).unwrap(), 50.0);
        assert_eq!(sensors.cpu.percentage(Some(Duration::from_secs(1))).unwrap(), 50.0);
        assert_eq!(sensors.disk.total().unwrap(), 500_000_000_000);
        assert_eq!(sensors.cpu.frequency_cores(&[0, 1]).unwrap(), 2500.0);
        assert_eq!(sensors.cpu.temperature_cores(&[2, 3]).unwrap(), 53.0);
    }

    #[test]
    fn test_static_net_formats_nicely() {
        let mut sensors = StaticSensors.into_sensor_set();
        let stats = sensors.net.stats("eth0", 1.0).unwrap();
        assert_eq!(statscreen_core::format::rate2human(stats.download_rate), "2.0 M/s");
        assert_eq!(statscreen_core::format::bytes2human(stats.downloaded), "4.0G");
    }
}
