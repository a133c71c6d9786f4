//! Network throughput for the wireless and wired interface.

use crate::dispatch::Dispatcher;
use crate::format::{bytes2human, rate2human};
use crate::sensors::NetReader;
use crate::theme::MetricPoint;
use crate::DispatchError;

/// Interface names shown under `NET.WLO` and `NET.ETH`. An empty name
/// disables that block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetInterfaces {
    pub wlo: String,
    pub eth: String,
}

impl NetInterfaces {
    pub fn new(wlo: impl Into<String>, eth: impl Into<String>) -> Self {
        Self {
            wlo: wlo.into(),
            eth: eth.into(),
        }
    }
}

/// Rates and totals of both interfaces, text only.
pub fn stats(
    net: &mut dyn NetReader,
    out: &mut Dispatcher<'_>,
    interfaces: &NetInterfaces,
    interval_secs: f64,
) -> Result<(), DispatchError> {
    for (kind, if_name) in [("WLO", &interfaces.wlo), ("ETH", &interfaces.eth)] {
        if if_name.is_empty() {
            log::debug!("NET.{kind}: no interface configured");
            continue;
        }

        let stats = net.stats(if_name, interval_secs)?;
        let point = MetricPoint::new("NET", kind);
        let texts = [
            ("UPLOAD", format!("{:>10}", rate2human(stats.upload_rate))),
            ("UPLOADED", format!("{:>6}", bytes2human(stats.uploaded))),
            ("DOWNLOAD", format!("{:>10}", rate2human(stats.download_rate))),
            ("DOWNLOADED", format!("{:>6}", bytes2human(stats.downloaded))),
        ];
        for (subtype, text) in &texts {
            out.present(&point.with_subtype(subtype), None, text, "")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeNet;
    use super::*;
    use crate::render::RecordingRenderer;
    use crate::theme::Theme;
    use serde_json::json;

    fn theme() -> Theme {
        let shown = json!({ "TEXT": { "SHOW": true } });
        Theme::from_value(json!({
            "STATS": { "NET": {
                "WLO": { "UPLOAD": shown.clone(), "DOWNLOADED": shown.clone() },
                "ETH": {
                    "UPLOAD": shown.clone(),
                    "UPLOADED": shown.clone(),
                    "DOWNLOAD": shown.clone(),
                    "DOWNLOADED": shown
                }
            } }
        }))
    }

    #[test]
    fn test_net_texts() {
        let theme = theme();
        let mut renderer = RecordingRenderer::new();
        stats(
            &mut FakeNet,
            &mut Dispatcher::new(&theme, &mut renderer),
            &NetInterfaces::new("wlan0", "eth0"),
            1.0,
        )
        .unwrap();

        assert_eq!(
            renderer.texts(),
            vec![
                // wlan0 has no previous sample
                "   nan B/s",
                "  nanB",
                "   2.0 K/s",
                "  1.0G",
                " 512.0 B/s",
                "  5.0G",
            ]
        );
    }

    #[test]
    fn test_empty_interface_is_skipped() {
        let theme = theme();
        let mut renderer = RecordingRenderer::new();
        stats(
            &mut FakeNet,
            &mut Dispatcher::new(&theme, &mut renderer),
            &NetInterfaces::new("", ""),
            1.0,
        )
        .unwrap();
        assert!(renderer.calls.is_empty());
    }
}
