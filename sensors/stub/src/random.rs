use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statscreen_core::{
    CpuReader, DiskReader, GpuReader, GpuStats, MemoryReader, NetReader, NetStats, SensorError,
    SensorSet,
};
use std::collections::HashMap;
use std::time::Duration;

/// Megabytes, as the memory ranges are expressed in MB.
const MB: u64 = 1_000_000;
const GB: u64 = 1_000_000_000;

/// Random readings for every sensor family.
#[derive(Debug)]
pub struct RandomSensors {
    rng: StdRng,
}

impl RandomSensors {
    /// Reproducible sequence of readings.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Split into one reader per family, each with its own generator.
    #[must_use]
    pub fn into_sensor_set(mut self) -> SensorSet {
        let mut fork = || StdRng::seed_from_u64(self.rng.gen());
        SensorSet {
            cpu: Box::new(RandomCpu { rng: fork() }),
            gpu: Box::new(RandomGpu { rng: fork() }),
            memory: Box::new(RandomMemory { rng: fork() }),
            disk: Box::new(RandomDisk { rng: fork() }),
            net: Box::new(RandomNet {
                rng: fork(),
                totals: HashMap::new(),
            }),
        }
    }
}

struct RandomCpu {
    rng: StdRng,
}

impl RandomCpu {
    const CORES: usize = 8;

    fn cores(&mut self, low: f64, high: f64) -> Vec<f64> {
        (0..Self::CORES).map(|_| self.rng.gen_range(low..=high)).collect()
    }
}

impl CpuReader for RandomCpu {
    fn percentage(&mut self, _interval: Option<Duration>) -> Result<f64, SensorError> {
        Ok(self.rng.gen_range(0.0..=100.0))
    }

    fn frequency(&mut self) -> Result<f64, SensorError> {
        Ok(self.rng.gen_range(800.0..=3400.0))
    }

    fn core_frequencies(&mut self) -> Result<Vec<f64>, SensorError> {
        Ok(self.cores(800.0, 3400.0))
    }

    fn load(&mut self) -> Result<(f64, f64, f64), SensorError> {
        Ok((
            self.rng.gen_range(0.0..=100.0),
            self.rng.gen_range(0.0..=100.0),
            self.rng.gen_range(0.0..=100.0),
        ))
    }

    fn is_temperature_available(&mut self) -> bool {
        true
    }

    fn temperature(&mut self) -> Result<f64, SensorError> {
        Ok(self.rng.gen_range(30.0..=90.0))
    }

    fn core_temperatures(&mut self) -> Result<Vec<f64>, SensorError> {
        Ok(self.cores(30.0, 90.0))
    }
}

struct RandomGpu {
    rng: StdRng,
}

impl GpuReader for RandomGpu {
    fn stats(&mut self) -> Result<GpuStats, SensorError> {
        Ok(GpuStats {
            load: self.rng.gen_range(0.0..=100.0),
            memory_percentage: self.rng.gen_range(0.0..=100.0),
            memory_used_mb: self.rng.gen_range(300.0..=16000.0),
            temperature: self.rng.gen_range(30.0..=90.0),
        })
    }

    fn is_available(&mut self) -> bool {
        true
    }
}

struct RandomMemory {
    rng: StdRng,
}

impl RandomMemory {
    fn megabytes(&mut self) -> u64 {
        self.rng.gen_range(300..=16000) * MB
    }
}

impl MemoryReader for RandomMemory {
    fn swap_percent(&mut self) -> Result<f64, SensorError> {
        Ok(self.rng.gen_range(0.0..=100.0))
    }

    fn swap_used(&mut self) -> Result<u64, SensorError> {
        Ok(self.megabytes())
    }

    fn swap_free(&mut self) -> Result<u64, SensorError> {
        Ok(self.megabytes())
    }

    fn virtual_percent(&mut self) -> Result<f64, SensorError> {
        Ok(self.rng.gen_range(0.0..=100.0))
    }

    fn virtual_used(&mut self) -> Result<u64, SensorError> {
        Ok(self.megabytes())
    }

    fn virtual_free(&mut self) -> Result<u64, SensorError> {
        Ok(self.megabytes())
    }
}

struct RandomDisk {
    rng: StdRng,
}

impl DiskReader for RandomDisk {
    fn usage_percent(&mut self) -> Result<f64, SensorError> {
        Ok(self.rng.gen_range(0.0..=100.0))
    }

    fn used(&mut self) -> Result<u64, SensorError> {
        Ok(self.rng.gen_range(1..=1000) * GB)
    }

    fn free(&mut self) -> Result<u64, SensorError> {
        Ok(self.rng.gen_range(1..=1000) * GB)
    }
}

/// Totals grow by the drawn rate so they stay monotonic.
struct RandomNet {
    rng: StdRng,
    totals: HashMap<String, (f64, f64)>,
}

impl NetReader for RandomNet {
    fn stats(&mut self, if_name: &str, interval_secs: f64) -> Result<NetStats, SensorError> {
        let upload_rate = self.rng.gen_range(0.0..=1_000_000.0);
        let download_rate = self.rng.gen_range(0.0..=10_000_000.0);
        let (uploaded, downloaded) = self.totals.entry(if_name.to_owned()).or_default();
        *uploaded += upload_rate * interval_secs.max(0.0);
        *downloaded += download_rate * interval_secs.max(0.0);

        Ok(NetStats {
            upload_rate,
            uploaded: *uploaded,
            download_rate,
            downloaded: *downloaded,
        })
    }
}
