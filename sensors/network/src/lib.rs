//! Per-interface network traffic for statscreen.
//!
//! Byte counters come from `/sys/class/net/<if>/statistics`; rates are the
//! counter deltas between two samples divided by the sampling period.

mod network;

pub use network::{IfCounters, LinuxNet, RateTracker};
