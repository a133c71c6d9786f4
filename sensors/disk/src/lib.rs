//! # statscreen-disk
//!
//! Filesystem usage for statscreen, read with `df -B1 -T -P` and served
//! through [`statscreen_core::DiskReader`].

mod disk;

pub use disk::{parse_df_output, DiskError, DiskInfo, LinuxDisk};
