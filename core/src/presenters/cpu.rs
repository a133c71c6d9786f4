//! CPU utilisation, frequency, load average and temperature.

use super::is_available;
use crate::dispatch::{truncate, Dispatcher};
use crate::sensors::CpuReader;
use crate::theme::MetricPoint;
use crate::{DispatchError, SensorError};
use serde_json::Value;

/// Core groups are named `C0` to `C9`.
const CORE_GROUPS: [&str; 10] = ["C0", "C1", "C2", "C3", "C4", "C5", "C6", "C7", "C8", "C9"];

pub fn percentage(cpu: &mut dyn CpuReader, out: &mut Dispatcher<'_>) -> Result<(), DispatchError> {
    let point = MetricPoint::new("CPU", "PERCENTAGE");
    let interval = out.theme().interval(&[point.category, point.kind]);
    let value = cpu.percentage(interval)?;
    if !is_available(&point, value) {
        return Ok(());
    }
    out.present(&point, Some(value), &format!("{:>3}", truncate(value)), "%")
}

/// Overall frequency, then each configured core group. Values are shown in
/// GHz.
pub fn frequency(cpu: &mut dyn CpuReader, out: &mut Dispatcher<'_>) -> Result<(), DispatchError> {
    let point = MetricPoint::new("CPU", "FREQUENCY");
    let ghz = cpu.frequency()? / 1000.0;
    if is_available(&point, ghz) {
        out.present(&point, Some(ghz), &format!("{ghz:.2}"), " GHz")?;
    }

    for (group, cores) in core_groups(out, "FREQUENCY") {
        let point = point.with_subtype("CORES").with_subsubtype(group);
        let ghz = cpu.frequency_cores(&cores)? / 1000.0;
        if is_available(&point, ghz) {
            out.present(&point, Some(ghz), &format!("{ghz:.2}"), " GHz")?;
        }
    }
    Ok(())
}

/// 1, 5 and 15 minute load averages.
pub fn load(cpu: &mut dyn CpuReader, out: &mut Dispatcher<'_>) -> Result<(), DispatchError> {
    let (one, five, fifteen) = cpu.load()?;
    for (subtype, value) in [("ONE", one), ("FIVE", five), ("FIFTEEN", fifteen)] {
        let point = MetricPoint::new("CPU", "LOAD").with_subtype(subtype);
        if is_available(&point, value) {
            out.present(&point, Some(value), &format!("{:>3}", truncate(value)), "%")?;
        }
    }
    Ok(())
}

/// Package temperature, then each configured core group.
pub fn temperature(cpu: &mut dyn CpuReader, out: &mut Dispatcher<'_>) -> Result<(), DispatchError> {
    let point = MetricPoint::new("CPU", "TEMPERATURE");
    let value = cpu.temperature()?;
    if is_available(&point, value) {
        out.present(&point, Some(value), &format!("{:>3}", truncate(value)), "°C")?;
    }

    for (group, cores) in core_groups(out, "TEMPERATURE") {
        let point = point.with_subtype("CORES").with_subsubtype(group);
        let value = cpu.temperature_cores(&cores)?;
        if is_available(&point, value) {
            out.present(&point, Some(value), &format!("{:>3}", truncate(value)), "°C")?;
        }
    }
    Ok(())
}

/// Parse a `CORE_LIST` entry: either `"0, 2, 4"` or a sequence of integers.
pub fn parse_core_list(spec: &Value) -> Result<Vec<usize>, SensorError> {
    match spec {
        Value::String(list) => list
            .split(',')
            .map(str::trim)
            .filter(|core| !core.is_empty())
            .map(|core| {
                core.parse::<usize>().map_err(|e| {
                    SensorError::parse_with_source(format!("invalid core '{core}' in '{list}'"), e)
                })
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|core| usize::try_from(core).ok())
                    .ok_or_else(|| SensorError::parse(format!("invalid core {item}")))
            })
            .collect(),
        Value::Number(n) => n
            .as_u64()
            .and_then(|core| usize::try_from(core).ok())
            .map(|core| vec![core])
            .ok_or_else(|| SensorError::parse(format!("invalid core {n}"))),
        other => Err(SensorError::parse(format!("unsupported core list {other}"))),
    }
}

/// Configured `(group, cores)` pairs under `CPU.<kind>.CORES`, in group
/// order. Groups with a missing or unparsable core list are left out.
fn core_groups(out: &Dispatcher<'_>, kind: &str) -> Vec<(&'static str, Vec<usize>)> {
    let Some(cores) = out.theme().node(&["CPU", kind, "CORES"]) else {
        return Vec::new();
    };

    CORE_GROUPS
        .iter()
        .filter_map(|&group| {
            let list = cores.get(group)?.get("CORE_LIST")?;
            if !crate::theme::is_truthy(list) {
                return None;
            }
            match parse_core_list(list) {
                Ok(indices) => Some((group, indices)),
                Err(e) => {
                    log::warn!("CPU.{kind}.CORES.{group}: skipping group: {e}");
                    None
                }
            }
        })
        .collect()
}
