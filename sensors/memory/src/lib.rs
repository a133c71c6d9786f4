//! Memory readings for statscreen.
//!
//! Reads `/proc/meminfo` and serves RAM and swap usage through
//! [`statscreen_core::MemoryReader`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use statscreen_core::MemoryReader;
//! use statscreen_memory::LinuxMemory;
//!
//! let mut memory = LinuxMemory::new();
//! println!("RAM used: {:.1}%", memory.virtual_percent()?);
//! # Ok::<(), statscreen_core::SensorError>(())
//! ```

pub mod memory;

pub use memory::{LinuxMemory, MemoryInfo};
