//! NVIDIA GPU readings for statscreen.
//!
//! Load, memory and temperature come from `nvidia-smi` CSV output.

pub mod nvidia_gpu;

pub use nvidia_gpu::{NvidiaGpu, parse_nvidia_smi_output};
