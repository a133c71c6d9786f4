//! # statscreen-core
//!
//! Stat-to-visual mapping engine for small system monitor displays.
//!
//! ## Features
//!
//! - **Color ramps** - value dependent colors with up to three tiers
//! - **Theme resolution** - per-metric display settings from a nested theme tree
//! - **Dispatch** - one routine turning a reading into bar, gauge and text draw calls
//! - **Sensor traits** - CPU, GPU, memory, disk and network readers behind trait objects
//! - **Presenters** - per-family formatting of readings
//! - **Error handling** - error types with context for every layer
//!
//! ## Quick Start
//!
//! ```rust
//! use statscreen_core::{Dispatcher, MetricPoint, RecordingRenderer, Theme};
//! use serde_json::json;
//!
//! let theme = Theme::from_value(json!({
//!     "STATS": { "CPU": { "PERCENTAGE": { "TEXT": { "SHOW": true, "SHOW_UNIT": true } } } }
//! }));
//! let mut renderer = RecordingRenderer::new();
//! Dispatcher::new(&theme, &mut renderer)
//!     .present(&MetricPoint::new("CPU", "PERCENTAGE"), Some(42.0), " 42", "%")?;
//! assert_eq!(renderer.texts(), vec![" 42%"]);
//! # Ok::<(), statscreen_core::DispatchError>(())
//! ```

pub mod config;
pub mod dispatch;
pub mod presenters;
pub mod ramp;
pub mod render;
pub mod sensors;
pub mod theme;

pub use config::{GlobalConfig, SensorBackend};
pub use dispatch::{Dispatcher, VisualConfig};
pub use presenters::{NetInterfaces, Presenter, PresenterContext};
pub use ramp::{ColorRamp, Rgb, Tier};
pub use render::{
    BarParams, CircularParams, DrawCall, RecordingRenderer, RenderError, Renderer, TextParams,
};
pub use sensors::{
    CpuReader, DiskReader, GpuReader, GpuStats, MemoryReader, NetReader, NetStats, SensorSet,
};
pub use theme::{MetricPoint, Resolution, Theme, ThemeError};

/// Formatting helpers shared by presenters.
pub mod format {
    const SYMBOLS: [&str; 8] = ["K", "M", "G", "T", "P", "E", "Z", "Y"];

    /// Scale `bytes` to the largest 1024-based unit it reaches.
    fn scale(bytes: f64) -> (f64, &'static str) {
        for (power, symbol) in SYMBOLS.iter().enumerate().rev() {
            let prefix = 1024f64.powi(i32::try_from(power).unwrap_or(0) + 1);
            if bytes.abs() >= prefix {
                return (bytes / prefix, symbol);
            }
        }
        (bytes, "B")
    }

    fn one_decimal(value: f64) -> String {
        if value.is_nan() {
            "nan".to_owned()
        } else {
            format!("{value:.1}")
        }
    }

    /// Shortest text that reads back as `value`, spelled the way theme
    /// authors see floats elsewhere: `nan`, `inf`, `42.0`, `1e+21`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statscreen_core::format;
    ///
    /// assert_eq!(format::py_float(42.0), "42.0");
    /// assert_eq!(format::py_float(1e21), "1e+21");
    /// assert_eq!(format::py_float(f64::NAN), "nan");
    /// ```
    #[must_use]
    pub fn py_float(value: f64) -> String {
        if value.is_nan() {
            return "nan".to_owned();
        }
        if value.is_infinite() {
            return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
        }

        let scientific = format!("{value:e}");
        let Some((mantissa, exponent)) = scientific.split_once('e') else {
            return scientific;
        };
        let Ok(exponent) = exponent.parse::<i32>() else {
            return scientific;
        };
        if value == 0.0 || (-4..16).contains(&exponent) {
            // Positional form, always with a fractional part
            let plain = format!("{value}");
            return if plain.contains('.') { plain } else { format!("{plain}.0") };
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }

    /// Format a byte count with one decimal and a unit letter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statscreen_core::format;
    ///
    /// assert_eq!(format::bytes2human(512.0), "512.0B");
    /// assert_eq!(format::bytes2human(1536.0), "1.5K");
    /// assert_eq!(format::bytes2human(1073741824.0), "1.0G");
    /// ```
    #[must_use]
    pub fn bytes2human(bytes: f64) -> String {
        let (value, symbol) = scale(bytes);
        format!("{}{symbol}", one_decimal(value))
    }

    /// Format a rate in bytes per second.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statscreen_core::format;
    ///
    /// assert_eq!(format::rate2human(2048.0), "2.0 K/s");
    /// assert_eq!(format::rate2human(f64::NAN), "nan B/s");
    /// ```
    #[must_use]
    pub fn rate2human(bytes_per_second: f64) -> String {
        let (value, symbol) = scale(bytes_per_second);
        format!("{} {symbol}/s", one_decimal(value))
    }
}

/// Error raised while presenting one metric.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("sensor read failed: {0}")]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Theme(#[from] ThemeError),
}

impl DispatchError {
    /// Whether the display loop can carry on after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Sensor(_))
    }
}

/// Common error types for sensor operations.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// I/O error occurred while reading sensor data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing sensor data from text format.
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Sensor is not available on this system.
    #[error("Sensor unavailable: {reason}")]
    Unavailable { reason: String },

    /// Permission denied accessing sensor data.
    #[error("Permission denied: {resource}")]
    PermissionDenied { resource: String },

    /// Invalid data format or unexpected values.
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
        data: Option<String>,
    },
}

impl SensorError {
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    pub fn parse_with_source<S: Into<String>, E>(message: S, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        Self::Unavailable { reason: reason.into() }
    }

    pub fn permission_denied<S: Into<String>>(resource: S) -> Self {
        Self::PermissionDenied {
            resource: resource.into(),
        }
    }

    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
            data: None,
        }
    }

    pub fn invalid_data_with_value<S: Into<String>, D: Into<String>>(message: S, data: D) -> Self {
        Self::InvalidData {
            message: message.into(),
            data: Some(data.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes2human() {
        assert_eq!(format::bytes2human(0.0), "0.0B");
        assert_eq!(format::bytes2human(1023.0), "1023.0B");
        assert_eq!(format::bytes2human(1024.0), "1.0K");
        assert_eq!(format::bytes2human(1_048_576.0), "1.0M");
        assert_eq!(format::bytes2human(5_368_709_120.0), "5.0G");
        assert_eq!(format::bytes2human(f64::NAN), "nanB");
    }

    #[test]
    fn test_py_float() {
        assert_eq!(format::py_float(0.0), "0.0");
        assert_eq!(format::py_float(-0.0), "-0.0");
        assert_eq!(format::py_float(42.0), "42.0");
        assert_eq!(format::py_float(0.1), "0.1");
        assert_eq!(format::py_float(-3.25), "-3.25");
        assert_eq!(format::py_float(0.0001), "0.0001");
        assert_eq!(format::py_float(0.00001), "1e-05");
        assert_eq!(format::py_float(1.5e-7), "1.5e-07");
        assert_eq!(format::py_float(1e15), "1000000000000000.0");
        assert_eq!(format::py_float(1e16), "1e+16");
        assert_eq!(format::py_float(1e21), "1e+21");
        assert_eq!(format::py_float(-2.5e100), "-2.5e+100");
        assert_eq!(format::py_float(f64::NAN), "nan");
        assert_eq!(format::py_float(f64::INFINITY), "inf");
        assert_eq!(format::py_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_rate2human() {
        assert_eq!(format::rate2human(0.0), "0.0 B/s");
        assert_eq!(format::rate2human(512.0), "512.0 B/s");
        assert_eq!(format::rate2human(1_572_864.0), "1.5 M/s");
    }

    #[test]
    fn test_sensor_error_constructors() {
        let err = SensorError::parse("Invalid format");
        assert!(matches!(err, SensorError::Parse { .. }));

        let err = SensorError::invalid_data_with_value("Negative size", "-1");
        assert_eq!(err.to_string(), "Invalid data: Negative size");

        let err = SensorError::unavailable("Not supported");
        assert_eq!(err.to_string(), "Sensor unavailable: Not supported");
    }

    #[test]
    fn test_dispatch_error_recoverable() {
        let err = DispatchError::from(SensorError::unavailable("gone"));
        assert!(err.is_recoverable());

        let err = DispatchError::from(RenderError::MissingImage {
            path: "bg.png".into(),
        });
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "render failed: background image not found: bg.png");
    }
}
