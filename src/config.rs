// User configuration loaded from ~/.config/tintkeep/config.toml.
// Falls back to sensible defaults when the file is missing.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::projector::ThemeVars;
use crate::wallpaper::MAX_WALLPAPER_BYTES;

/// Application configuration, deserialized from `~/.config/tintkeep/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub wallpaper: WallpaperConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Class marking containers that display the wallpaper.
    pub surface_marker: String,
    /// Root class toggled by dark mode.
    pub dark_class: String,
    /// Image reference used when no wallpaper is stored.
    pub default_wallpaper: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let vars = ThemeVars::default();
        Self {
            surface_marker: vars.surface_marker,
            dark_class: vars.dark_class,
            default_wallpaper: vars.default_wallpaper,
        }
    }
}

impl ThemeConfig {
    pub fn vars(&self) -> ThemeVars {
        ThemeVars {
            surface_marker: self.surface_marker.clone(),
            dark_class: self.dark_class.clone(),
            default_wallpaper: self.default_wallpaper.clone(),
            ..ThemeVars::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Delays after a navigation at which projection is re-run (default: 100, 300, 500).
    pub retry_delays_ms: Vec<u64>,
    /// How often live style state is compared with stored preferences (default: 2000).
    pub drift_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            retry_delays_ms: vec![100, 300, 500],
            drift_interval_ms: 2000,
        }
    }
}

impl DriverConfig {
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    pub fn drift_interval(&self) -> Duration {
        // tokio intervals panic on a zero period
        Duration::from_millis(self.drift_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WallpaperConfig {
    /// Largest accepted wallpaper file, in bytes (default: 5 MiB).
    pub max_bytes: u64,
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_WALLPAPER_BYTES,
        }
    }
}

/// Verbosity of this crate's own log events. Anything else in the config
/// file is a parse error, so `Config::load` falls back to defaults instead
/// of handing the subscriber a directive it can't parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for this crate's own events (default: debug).
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl Config {
    /// Read config from disk, or return defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tintkeep")
            .join("config.toml")
    }
}
