//! Global configuration loaded from `~/.config/statscreen/config.ron`.

use crate::SensorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "statscreen";
const CONFIG_FILE: &str = "config.ron";

/// Which sensor backend feeds the presenters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorBackend {
    /// Linux readers when `/proc` is present, random stubs otherwise.
    #[default]
    Auto,
    /// `/proc`, sysfs, `df` and `nvidia-smi`.
    Linux,
    /// Random values in plausible ranges.
    Stub,
    /// Fixed values.
    Static,
}

impl fmt::Display for SensorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Linux => write!(f, "linux"),
            Self::Stub => write!(f, "stub"),
            Self::Static => write!(f, "static"),
        }
    }
}

impl std::str::FromStr for SensorBackend {
    type Err = SensorBackendParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "linux" | "python" => Ok(Self::Linux),
            "stub" | "random" => Ok(Self::Stub),
            "static" => Ok(Self::Static),
            _ => Err(SensorBackendParseError {
                input: s.to_owned(),
                valid_options: &["auto", "linux", "stub", "static"],
            }),
        }
    }
}

/// Error type for parsing [`SensorBackend`] from string.
#[derive(Debug, thiserror::Error)]
#[error("Invalid sensor backend '{input}'. Valid options: {}", valid_options.join(", "))]
pub struct SensorBackendParseError {
    input: String,
    valid_options: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Sensor backend
    #[serde(default)]
    pub hw_sensors: SensorBackend,
    /// Wired interface shown under `NET.ETH`; empty to hide
    #[serde(default)]
    pub eth: String,
    /// Wireless interface shown under `NET.WLO`; empty to hide
    #[serde(default)]
    pub wlo: String,
    /// Mount point whose filesystem is shown under `DISK`
    #[serde(default = "default_disk_path")]
    pub disk_path: PathBuf,
    /// Theme file (YAML or JSON)
    #[serde(default)]
    pub theme: Option<PathBuf>,
    /// Index of the GPU passed to `nvidia-smi`
    #[serde(default)]
    pub gpu_id: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            hw_sensors: SensorBackend::default(),
            eth: String::new(),
            wlo: String::new(),
            disk_path: default_disk_path(),
            theme: None,
            gpu_id: 0,
        }
    }
}

fn default_disk_path() -> PathBuf {
    PathBuf::from("/")
}

impl GlobalConfig {
    /// Load configuration from the standard config file location.
    ///
    /// Searches for config in:
    /// 1. ~/.config/statscreen/config.ron
    /// 2. ~/.statscreen/config.ron (fallback)
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self, SensorError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path),
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SensorError> {
        let content = std::fs::read_to_string(path)?;
        let config = ron::from_str(&content).map_err(|e| {
            SensorError::parse_with_source(format!("Failed to parse config file {}", path.display()), e)
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    #[must_use]
    pub fn find_config_file() -> Option<PathBuf> {
        let xdg = dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE));
        let home = dirs::home_dir().map(|dir| dir.join(format!(".{APP_DIR}")).join(CONFIG_FILE));
        [xdg, home].into_iter().flatten().find(|path| path.exists())
    }

    /// Path new config files are written to.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), SensorError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SensorError::parse_with_source("Failed to serialize config", e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// A typical desktop setup.
    #[must_use]
    pub fn example_config() -> Self {
        Self {
            hw_sensors: SensorBackend::Auto,
            eth: "eth0".to_owned(),
            wlo: "wlan0".to_owned(),
            disk_path: default_disk_path(),
            theme: Some(PathBuf::from("themes/3.5inchTheme2/theme.yaml")),
            gpu_id: 0,
        }
    }

    /// Write a commented example config.
    pub fn save_example_config_to_file(path: &Path) -> Result<(), SensorError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r#"// statscreen configuration
// Copy to ~/.config/statscreen/config.ron. Command line arguments override
// these settings.

(
    // Sensor backend: auto, linux, stub, static
    hw_sensors: auto,

    // Network interfaces shown under NET.ETH and NET.WLO.
    // Leave empty to hide the block.
    eth: "eth0",
    wlo: "wlan0",

    // Filesystem shown under DISK
    disk_path: "/",

    // Theme file, relative paths are resolved against the working directory
    theme: Some("themes/3.5inchTheme2/theme.yaml"),

    // GPU index for nvidia-smi
    gpu_id: 0,
)
"#;
        std::fs::write(path, template)?;
        Ok(())
    }
}
