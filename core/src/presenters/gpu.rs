//! Discrete GPU load, memory and temperature.

use crate::dispatch::{truncate, Dispatcher};
use crate::sensors::{GpuReader, GpuStats};
use crate::theme::MetricPoint;
use crate::DispatchError;
use std::fmt;

/// A GPU sub-value that can be missing on some hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuMetric {
    Load,
    Memory,
    Temperature,
}

impl fmt::Display for GpuMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.write_str("load"),
            Self::Memory => f.write_str("memory usage"),
            Self::Temperature => f.write_str("temperature"),
        }
    }
}

pub fn stats(gpu: &mut dyn GpuReader, out: &mut Dispatcher<'_>) -> Result<Vec<GpuMetric>, DispatchError> {
    let stats = gpu.stats()?;
    display_gpu_stats(out, &stats)
}

/// Draw each available field of `stats`. Fields that are NaN are skipped
/// independently and returned.
pub fn display_gpu_stats(
    out: &mut Dispatcher<'_>,
    stats: &GpuStats,
) -> Result<Vec<GpuMetric>, DispatchError> {
    let mut missing = Vec::new();

    if stats.load.is_nan() {
        missing.push(GpuMetric::Load);
    } else {
        out.present(
            &MetricPoint::new("GPU", "PERCENTAGE"),
            Some(stats.load.trunc()),
            &format!("{:>3}", truncate(stats.load)),
            "%",
        )?;
    }

    if stats.memory_percentage.is_nan() {
        missing.push(GpuMetric::Memory);
    } else {
        out.present(
            &MetricPoint::new("GPU", "MEMORY"),
            Some(stats.memory_percentage.trunc()),
            &format!("{:>5}", truncate(stats.memory_used_mb)),
            " M",
        )?;
    }

    if stats.temperature.is_nan() {
        missing.push(GpuMetric::Temperature);
    } else {
        out.present(
            &MetricPoint::new("GPU", "TEMPERATURE"),
            Some(stats.temperature),
            &format!("{:>3}", truncate(stats.temperature)),
            "°C",
        )?;
    }

    for metric in &missing {
        log::warn!("GPU {metric} is not supported on this system");
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeGpu;
    use super::*;
    use crate::render::{DrawCall, RecordingRenderer};
    use crate::theme::Theme;
    use serde_json::json;

    fn theme() -> Theme {
        Theme::from_value(json!({
            "STATS": { "GPU": {
                "PERCENTAGE": { "TEXT": { "SHOW": true, "SHOW_UNIT": true } },
                "MEMORY": {
                    "GRAPH": { "SHOW": true, "WIDTH": 50 },
                    "TEXT": { "SHOW": true, "SHOW_UNIT": true }
                },
                "TEMPERATURE": { "TEXT": { "SHOW": true, "SHOW_UNIT": true } }
            } }
        }))
    }

    #[test]
    fn test_nan_load_skips_only_load() {
        let theme = theme();
        let mut renderer = RecordingRenderer::new();
        let stats = GpuStats {
            load: f64::NAN,
            memory_percentage: 50.0,
            memory_used_mb: 4000.0,
            temperature: 60.0,
        };
        let missing =
            display_gpu_stats(&mut Dispatcher::new(&theme, &mut renderer), &stats).unwrap();

        assert_eq!(missing, vec![GpuMetric::Load]);
        assert_eq!(renderer.texts(), vec![" 4000 M", " 60°C"]);
        let DrawCall::Bar(bar) = &renderer.calls[0] else { panic!("expected memory bar") };
        assert_eq!(bar.value, 50);
    }

    #[test]
    fn test_all_fields_present() {
        let theme = theme();
        let mut renderer = RecordingRenderer::new();
        let mut gpu = FakeGpu(GpuStats {
            load: 99.9,
            memory_percentage: 12.0,
            memory_used_mb: 980.6,
            temperature: 71.2,
        });
        let missing = stats(&mut gpu, &mut Dispatcher::new(&theme, &mut renderer)).unwrap();

        assert!(missing.is_empty());
        assert_eq!(renderer.texts(), vec![" 99%", "  980 M", " 71°C"]);
    }

    #[test]
    fn test_everything_unavailable() {
        let theme = theme();
        let mut renderer = RecordingRenderer::new();
        let missing = display_gpu_stats(
            &mut Dispatcher::new(&theme, &mut renderer),
            &GpuStats::UNAVAILABLE,
        )
        .unwrap();

        assert_eq!(
            missing,
            vec![GpuMetric::Load, GpuMetric::Memory, GpuMetric::Temperature]
        );
        assert!(renderer.calls.is_empty());
    }
}
