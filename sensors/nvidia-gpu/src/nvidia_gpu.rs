//! NVIDIA GPU monitoring using nvidia-smi parsing.

use statscreen_core::{GpuReader, GpuStats, SensorError};
use std::process::Command;
use std::str;

const QUERY_FIELDS: &str = "utilization.gpu,memory.used,memory.total,temperature.gpu";

/// Parse one line of
/// `nvidia-smi --query-gpu=utilization.gpu,memory.used,memory.total,temperature.gpu --format=csv,noheader,nounits`.
///
/// Fields the driver cannot report (`[N/A]`, `[Not Supported]`) become NaN.
pub fn parse_nvidia_smi_output(output: &str) -> Result<GpuStats, SensorError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| SensorError::parse("Empty nvidia-smi output"))?;

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(SensorError::parse(format!(
            "Insufficient nvidia-smi data fields: expected 4, got {}",
            fields.len()
        )));
    }

    let load = parse_field(fields[0], "GPU utilization")?;
    let memory_used_mb = parse_field(fields[1], "memory used")?;
    let memory_total_mb = parse_field(fields[2], "memory total")?;
    let temperature = parse_field(fields[3], "temperature")?;

    let memory_percentage = if memory_total_mb > 0.0 {
        memory_used_mb / memory_total_mb * 100.0
    } else {
        f64::NAN
    };

    Ok(GpuStats {
        load,
        memory_percentage,
        memory_used_mb,
        temperature,
    })
}

fn parse_field(field: &str, what: &str) -> Result<f64, SensorError> {
    if field.starts_with('[') {
        return Ok(f64::NAN);
    }
    field
        .parse::<f64>()
        .map_err(|e| SensorError::parse_with_source(format!("Failed to parse {what}"), e))
}

/// [`GpuReader`] for one NVIDIA GPU.
#[derive(Debug)]
pub struct NvidiaGpu {
    gpu_id: u32,
    available: Option<bool>,
}

impl NvidiaGpu {
    #[must_use]
    pub const fn new(gpu_id: u32) -> Self {
        Self {
            gpu_id,
            available: None,
        }
    }

    #[must_use]
    pub const fn gpu_id(&self) -> u32 {
        self.gpu_id
    }

    fn query(&self) -> Result<GpuStats, SensorError> {
        let output = Command::new("nvidia-smi")
            .arg(format!("--query-gpu={QUERY_FIELDS}"))
            .arg("--format=csv,noheader,nounits")
            .arg(format!("--id={}", self.gpu_id))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SensorError::unavailable("nvidia-smi command not found. Please install NVIDIA drivers.")
                } else {
                    SensorError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SensorError::unavailable(format!("nvidia-smi failed: {}", stderr.trim())));
        }

        let stdout = str::from_utf8(&output.stdout)
            .map_err(|e| SensorError::parse_with_source("Invalid UTF-8 in nvidia-smi output", e))?;
        parse_nvidia_smi_output(stdout)
    }
}

impl GpuReader for NvidiaGpu {
    fn stats(&mut self) -> Result<GpuStats, SensorError> {
        self.query()
    }

    fn is_available(&mut self) -> bool {
        if let Some(available) = self.available {
            return available;
        }
        let available = match self.query() {
            Ok(_) => true,
            Err(e) => {
                log::info!("NVIDIA GPU {} not available: {e}", self.gpu_id);
                false
            }
        };
        self.available = Some(available);
        available
    }
}
