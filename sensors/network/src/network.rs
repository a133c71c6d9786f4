use statscreen_core::{NetReader, NetStats, SensorError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Cumulative byte counters of one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Previous counters per interface.
///
/// An interface seen for the first time, or one that disappeared, reports
/// [`NetStats::UNAVAILABLE`] for that cycle.
#[derive(Debug, Default)]
pub struct RateTracker {
    previous: HashMap<String, IfCounters>,
}

impl RateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn update(&mut self, if_name: &str, current: Option<IfCounters>, interval_secs: f64) -> NetStats {
        let Some(current) = current else {
            self.previous.remove(if_name);
            return NetStats::UNAVAILABLE;
        };

        let Some(previous) = self.previous.insert(if_name.to_owned(), current) else {
            return NetStats::UNAVAILABLE;
        };

        if interval_secs <= 0.0 {
            return NetStats::UNAVAILABLE;
        }

        // Counters restart from zero when a driver is reloaded
        let sent = current.tx_bytes.saturating_sub(previous.tx_bytes);
        let received = current.rx_bytes.saturating_sub(previous.rx_bytes);

        NetStats {
            upload_rate: sent as f64 / interval_secs,
            uploaded: current.tx_bytes as f64,
            download_rate: received as f64 / interval_secs,
            downloaded: current.rx_bytes as f64,
        }
    }
}

/// [`NetReader`] backed by sysfs.
#[derive(Debug)]
pub struct LinuxNet {
    root: PathBuf,
    tracker: RateTracker,
}

impl LinuxNet {
    const SYSFS_NET_PATH: &'static str = "/sys/class/net";

    #[must_use]
    pub fn new() -> Self {
        Self::with_root(Self::SYSFS_NET_PATH)
    }

    /// Read interfaces from another directory laid out like `/sys/class/net`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tracker: RateTracker::new(),
        }
    }

    fn read_counters(&self, if_name: &str) -> Result<Option<IfCounters>, SensorError> {
        let stats_dir = self.root.join(if_name).join("statistics");
        if !stats_dir.is_dir() {
            log::debug!("Network interface not found: {if_name}");
            return Ok(None);
        }

        Ok(Some(IfCounters {
            rx_bytes: read_stat_file(&stats_dir.join("rx_bytes"))?,
            tx_bytes: read_stat_file(&stats_dir.join("tx_bytes"))?,
        }))
    }
}

impl Default for LinuxNet {
    fn default() -> Self {
        Self::new()
    }
}

impl NetReader for LinuxNet {
    fn stats(&mut self, if_name: &str, interval_secs: f64) -> Result<NetStats, SensorError> {
        let counters = self.read_counters(if_name)?;
        Ok(self.tracker.update(if_name, counters, interval_secs))
    }
}

fn read_stat_file(path: &Path) -> Result<u64, SensorError> {
    let content = fs::read_to_string(path)?;
    content.trim().parse::<u64>().map_err(|e| {
        SensorError::parse_with_source(format!("Failed to parse {}", path.display()), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(rx_bytes: u64, tx_bytes: u64) -> Option<IfCounters> {
        Some(IfCounters { rx_bytes, tx_bytes })
    }

    #[test]
    fn test_first_sample_is_unavailable() {
        let mut tracker = RateTracker::new();
        let stats = tracker.update("eth0", counters(1000, 500), 1.0);
        assert!(stats.is_unavailable());
        assert!(stats.upload_rate.is_nan());
        assert!(stats.download_rate.is_nan());
    }

    #[test]
    fn test_rates_over_interval() {
        let mut tracker = RateTracker::new();
        tracker.update("eth0", counters(1000, 500), 2.0);
        let stats = tracker.update("eth0", counters(5000, 2500), 2.0);

        assert_eq!(stats.download_rate, 2000.0);
        assert_eq!(stats.upload_rate, 1000.0);
        assert_eq!(stats.downloaded, 5000.0);
        assert_eq!(stats.uploaded, 2500.0);
    }

    #[test]
    fn test_interfaces_are_tracked_separately() {
        let mut tracker = RateTracker::new();
        tracker.update("eth0", counters(0, 0), 1.0);
        assert!(tracker.update("wlan0", counters(100, 100), 1.0).is_unavailable());
        assert_eq!(tracker.update("eth0", counters(10, 20), 1.0).upload_rate, 20.0);
    }

    #[test]
    fn test_vanished_interface_restarts() {
        let mut tracker = RateTracker::new();
        tracker.update("usb0", counters(10, 10), 1.0);
        assert!(tracker.update("usb0", None, 1.0).is_unavailable());
        assert!(tracker.update("usb0", counters(20, 20), 1.0).is_unavailable());
    }

    #[test]
    fn test_counter_reset_does_not_underflow() {
        let mut tracker = RateTracker::new();
        tracker.update("eth0", counters(5000, 5000), 1.0);
        let stats = tracker.update("eth0", counters(100, 100), 1.0);
        assert_eq!(stats.download_rate, 0.0);
        assert_eq!(stats.downloaded, 100.0);
    }

    #[test]
    fn test_linux_net_from_sysfs_layout() {
        let root = tempfile::tempdir().unwrap();
        let stats_dir = root.path().join("eth0").join("statistics");
        fs::create_dir_all(&stats_dir).unwrap();
        fs::write(stats_dir.join("rx_bytes"), "4096\n").unwrap();
        fs::write(stats_dir.join("tx_bytes"), "1024\n").unwrap();

        let mut net = LinuxNet::with_root(root.path());
        assert!(net.stats("eth0", 1.0).unwrap().is_unavailable());

        fs::write(stats_dir.join("rx_bytes"), "6144\n").unwrap();
        let stats = net.stats("eth0", 1.0).unwrap();
        assert_eq!(stats.download_rate, 2048.0);
        assert_eq!(stats.upload_rate, 0.0);

        assert!(net.stats("wlan0", 1.0).unwrap().is_unavailable());
    }
}
