//! RAM and swap usage.

use crate::dispatch::Dispatcher;
use crate::sensors::MemoryReader;
use crate::theme::MetricPoint;
use crate::DispatchError;

const BYTES_PER_MB: u64 = 1_000_000;

pub fn stats(memory: &mut dyn MemoryReader, out: &mut Dispatcher<'_>) -> Result<(), DispatchError> {
    let swap_percent = memory.swap_percent()?.trunc();
    let virtual_percent = memory.virtual_percent()?.trunc();

    // Single level SWAP/VIRTUAL entries of older themes
    percent(out, MetricPoint::new("MEMORY", "SWAP"), swap_percent)?;
    percent(out, MetricPoint::new("MEMORY", "VIRTUAL"), virtual_percent)?;

    let swap = MetricPoint::new("MEMORY", "SWAP");
    percent(out, swap.with_subtype("PERCENT"), swap_percent)?;
    megabytes(out, swap.with_subtype("USED"), memory.swap_used()?)?;
    megabytes(out, swap.with_subtype("FREE"), memory.swap_free()?)?;

    let virt = MetricPoint::new("MEMORY", "VIRTUAL");
    percent(out, virt.with_subtype("PERCENT"), virtual_percent)?;
    megabytes(out, virt.with_subtype("USED"), memory.virtual_used()?)?;
    megabytes(out, virt.with_subtype("FREE"), memory.virtual_free()?)?;

    Ok(())
}

fn percent(out: &mut Dispatcher<'_>, point: MetricPoint<'_>, value: f64) -> Result<(), DispatchError> {
    out.present(&point, Some(value), &value.to_string(), "%")
}

fn megabytes(out: &mut Dispatcher<'_>, point: MetricPoint<'_>, bytes: u64) -> Result<(), DispatchError> {
    #[allow(clippy::cast_precision_loss)]
    let value = bytes as f64;
    out.present(&point, Some(value), &format!("{:>5}", bytes / BYTES_PER_MB), " M")
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeMemory;
    use super::*;
    use crate::render::{DrawCall, RecordingRenderer};
    use crate::theme::Theme;
    use serde_json::json;

    #[test]
    fn test_memory_texts() {
        let theme = Theme::from_value(json!({
            "STATS": { "MEMORY": {
                "SWAP": {
                    "GRAPH": { "SHOW": true },
                    "USED": { "TEXT": { "SHOW": true, "SHOW_UNIT": true } }
                },
                "VIRTUAL": {
                    "PERCENT": { "TEXT": { "SHOW": true, "SHOW_UNIT": true } },
                    "USED": { "SHOW": true, "SHOW_UNIT": true },
                    "FREE": { "TEXT": { "SHOW": true } }
                }
            } }
        }));
        let mut renderer = RecordingRenderer::new();
        stats(&mut FakeMemory, &mut Dispatcher::new(&theme, &mut renderer)).unwrap();

        let DrawCall::Bar(swap_bar) = &renderer.calls[0] else { panic!("expected swap bar") };
        assert_eq!(swap_bar.value, 12);
        // VIRTUAL.USED is a legacy entry upgraded at load time
        assert_eq!(renderer.texts(), vec![" 1500 M", "63%", "10240 M", " 5760"]);
    }

    #[test]
    fn test_memory_values_are_bytes() {
        let theme = Theme::from_value(json!({
            "STATS": { "MEMORY": { "VIRTUAL": {
                "FREE": { "GRAPH": { "SHOW": true, "MAX_VALUE": 16000000000u64 } }
            } } }
        }));
        let mut renderer = RecordingRenderer::new();
        stats(&mut FakeMemory, &mut Dispatcher::new(&theme, &mut renderer)).unwrap();

        let DrawCall::Bar(bar) = &renderer.calls[0] else { panic!("expected bar") };
        assert_eq!(bar.value, 5_760_000_000);
    }
}
