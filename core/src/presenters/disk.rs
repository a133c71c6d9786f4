//! Filesystem usage.

use crate::dispatch::Dispatcher;
use crate::sensors::DiskReader;
use crate::theme::MetricPoint;
use crate::DispatchError;

const BYTES_PER_GB: u64 = 1_000_000_000;

/// `USED`, `FREE` and `TOTAL` in GB. All three carry the used percentage as
/// their value so bars and colors track how full the disk is.
pub fn stats(disk: &mut dyn DiskReader, out: &mut Dispatcher<'_>) -> Result<(), DispatchError> {
    let used = disk.used()?;
    let free = disk.free()?;
    let total = disk.total()?;
    let used_percent = disk.usage_percent()?.trunc();

    for (kind, bytes) in [("USED", used), ("FREE", free), ("TOTAL", total)] {
        out.present(
            &MetricPoint::new("DISK", kind),
            Some(used_percent),
            &format!("{:>5}", bytes / BYTES_PER_GB),
            " G",
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeDisk;
    use super::*;
    use crate::render::{DrawCall, RecordingRenderer};
    use crate::theme::Theme;
    use serde_json::json;

    #[test]
    fn test_disk_stats() {
        let theme = Theme::from_value(json!({
            "STATS": { "DISK": {
                "USED": {
                    "GRAPH": { "SHOW": true },
                    "TEXT": { "SHOW": true, "SHOW_UNIT": true }
                },
                "FREE": { "TEXT": { "SHOW": true, "SHOW_UNIT": true } },
                "TOTAL": { "TEXT": { "SHOW": true } }
            } }
        }));
        let mut renderer = RecordingRenderer::new();
        stats(&mut FakeDisk, &mut Dispatcher::new(&theme, &mut renderer)).unwrap();

        let DrawCall::Bar(bar) = &renderer.calls[0] else { panic!("expected bar") };
        assert_eq!(bar.value, 41);
        assert_eq!(renderer.texts(), vec!["  200 G", "  280 G", "  480"]);
    }
}
