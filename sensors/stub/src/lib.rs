//! Sensor backends that need no hardware.
//!
//! [`RandomSensors`] draws every reading uniformly from a plausible range,
//! which is handy for theme development. [`StaticSensors`] always returns the
//! same values, which keeps screenshots and tests stable.

mod fixed;
mod random;

pub use fixed::StaticSensors;
pub use random::RandomSensors;
