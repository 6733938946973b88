//! Startup configuration
//!
//! Read once at launch from an optional TOML file in the platform config
//! directory, then overridden from the environment. Nothing is written back.

use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::weather::DEFAULT_BASE_URL;

/// Environment variable holding the weather API credential
pub const API_KEY_ENV: &str = "WEATHER_CLOCK_API_KEY";
/// Environment variable overriding the background image directory
pub const ASSETS_ENV: &str = "WEATHER_CLOCK_ASSETS";

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("IO error reading {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("No weather API key configured; set {env} or `api_key` in {0}", env = API_KEY_ENV)]
    MissingApiKey(String),
}

/// Settings for the weather clock
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Directory holding morning.jpg, afternoon.jpg, evening.jpg and night.jpg
    pub assets_dir: PathBuf,
    /// Timezone selected at launch; system-local when unset
    pub initial_timezone: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            assets_dir: PathBuf::from("assets"),
            initial_timezone: None,
            window_width: 800,
            window_height: 600,
        }
    }
}

impl WidgetConfig {
    /// Load the config file (if any) and apply environment overrides
    pub fn load(clock_name: &str) -> Result<Self, ConfigError> {
        let path = config_path(clock_name).ok_or(ConfigError::NoConfigDir)?;
        let mut config = Self::from_file(&path)?.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Returns `None` if the file doesn't exist yet
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(dir) = lookup(ASSETS_ENV).filter(|d| !d.trim().is_empty()) {
            self.assets_dir = PathBuf::from(dir);
        }
    }

    /// The credential, which must be present before any lookup is made
    pub fn require_api_key(&self, clock_name: &str) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                let location = config_path(clock_name)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("{}.toml", clock_name));
                ConfigError::MissingApiKey(location)
            })
    }

    /// Path of the background image for a bucket
    pub fn background_path(&self, bucket: crate::TimeOfDay) -> PathBuf {
        self.assets_dir.join(bucket.asset_file_name())
    }
}

/// Get the base configuration directory for all clocks
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "clock-series", "clocks")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the configuration file path for a specific clock
pub fn config_path(clock_name: &str) -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(format!("{}.toml", clock_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeOfDay;
    use std::collections::HashMap;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("weather-clock-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_config_path() {
        let path = config_path("weather_clock");
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("weather_clock.toml"));
    }

    #[test]
    fn test_missing_file_is_none() {
        let path = std::env::temp_dir().join("weather-clock-does-not-exist.toml");
        assert!(WidgetConfig::from_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_file("partial.toml", "api_key = \"abc\"\ninitial_timezone = \"Asia/Tokyo\"\n");
        let config = WidgetConfig::from_file(&path).unwrap().unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.initial_timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.window_width, 800);
    }

    #[test]
    fn test_bad_file_is_parse_error() {
        let path = temp_file("bad.toml", "window_width = \"wide\"");
        let err = WidgetConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = [(API_KEY_ENV, "from-env"), (ASSETS_ENV, "/opt/clock")].into();
        let mut config = WidgetConfig {
            api_key: Some("from-file".into()),
            ..WidgetConfig::default()
        };
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.background_path(TimeOfDay::Night), PathBuf::from("/opt/clock/night.jpg"));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = WidgetConfig::default();
        let err = config.require_api_key("weather_clock").unwrap_err();
        let message = err.to_string();
        assert!(message.contains(API_KEY_ENV), "{}", message);
        assert!(message.contains("weather_clock.toml"), "{}", message);

        config.api_key = Some("   ".into());
        assert!(config.require_api_key("weather_clock").is_err());

        config.api_key = Some("KEY".into());
        assert_eq!(config.require_api_key("weather_clock").unwrap(), "KEY");
    }
}
