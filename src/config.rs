//! Configuration loader and validator
//!
//! Loads operational settings from a TOML file. The controller-to-event
//! mapping itself is fixed; only timing, device identity and device file
//! paths can be tuned. Every field defaults to the built-in value, so a
//! missing file simply means defaults, and a broken file is reported and
//! ignored rather than stopping startup.

use crate::device::uinput_ffi::UINPUT_MAX_NAME_SIZE;
use crate::device::DeviceIdentity;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Sleep between poll ticks (milliseconds)
    #[serde(default = "default_poll_period_ms")]
    pub poll_period_ms: u64,

    /// Wait after library startup before enumerating bases (milliseconds)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Name the virtual joystick registers under
    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,

    #[serde(default = "default_product_id")]
    pub product_id: u16,

    #[serde(default = "default_version")]
    pub version: u16,

    /// uinput device file tried first
    #[serde(default = "default_primary_uinput_path")]
    pub primary_uinput_path: PathBuf,

    /// uinput device file tried when the primary cannot be opened
    #[serde(default = "default_secondary_uinput_path")]
    pub secondary_uinput_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_period_ms: default_poll_period_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            device_name: default_device_name(),
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            version: default_version(),
            primary_uinput_path: default_primary_uinput_path(),
            secondary_uinput_path: default_secondary_uinput_path(),
        }
    }
}

fn default_poll_period_ms() -> u64 { 20 }
fn default_settle_delay_ms() -> u64 { 500 }
fn default_device_name() -> String { "Hydrajoy virtual joystick".to_string() }
fn default_vendor_id() -> u16 { 0x1234 }
fn default_product_id() -> u16 { 0xfedc }
fn default_version() -> u16 { 1 }
fn default_primary_uinput_path() -> PathBuf { PathBuf::from("/dev/input/uinput") }
fn default_secondary_uinput_path() -> PathBuf { PathBuf::from("/dev/uinput") }

impl Settings {
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn device_identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            name: self.device_name.clone(),
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            version: self.version,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        info!("Loading configuration from: {}", path_ref.display());

        let content = std::fs::read_to_string(path_ref)?;
        let config = Self::from_toml(&content)?;

        debug!("  - Poll period: {} ms", config.settings.poll_period_ms);
        debug!("  - Device name: '{}'", config.settings.device_name);

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            debug!("No config at {}, using defaults", path_ref.display());
            return Ok(Self::default());
        }
        Self::load(path_ref)
    }

    /// Load configuration, falling back to defaults on any failure
    pub fn load_or_warn<P: AsRef<Path>>(path: P) -> Self {
        let path_ref = path.as_ref();
        match Self::load_or_default(path_ref) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring {}: {}. Using defaults", path_ref.display(), e);
                Self::default()
            }
        }
    }

    /// Load configs/hydrajoy.toml if present and valid, defaults otherwise
    pub fn load_default() -> Self {
        Self::load_or_warn("configs/hydrajoy.toml")
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.settings;

        if settings.poll_period_ms == 0 {
            return Err(ConfigError::Invalid("poll_period_ms must be positive".into()));
        }

        if settings.device_name.is_empty() {
            return Err(ConfigError::Invalid("device_name must not be empty".into()));
        }

        // One byte is reserved for the NUL terminator
        if settings.device_name.len() >= UINPUT_MAX_NAME_SIZE {
            return Err(ConfigError::Invalid(format!(
                "device_name must be shorter than {} bytes",
                UINPUT_MAX_NAME_SIZE
            )));
        }

        if settings.primary_uinput_path == settings.secondary_uinput_path {
            return Err(ConfigError::Invalid(
                "primary_uinput_path and secondary_uinput_path must differ".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.poll_period(), Duration::from_millis(20));
        assert_eq!(settings.settle_delay(), Duration::from_millis(500));
        assert_eq!(settings.device_name, "Hydrajoy virtual joystick");
        assert_eq!(settings.vendor_id, 0x1234);
        assert_eq!(settings.product_id, 0xfedc);
        assert_eq!(settings.version, 1);
        assert_eq!(settings.primary_uinput_path, PathBuf::from("/dev/input/uinput"));
        assert_eq!(settings.secondary_uinput_path, PathBuf::from("/dev/uinput"));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
            [settings]
            poll_period_ms = 10
            device_name = "Bench joystick"
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.poll_period_ms, 10);
        assert_eq!(config.settings.device_name, "Bench joystick");
        assert_eq!(config.settings.settle_delay_ms, 500);
    }

    #[test]
    fn test_zero_poll_period() {
        let err = Config::from_toml("[settings]\npoll_period_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_long_device_name() {
        let mut config = Config::default();
        config.settings.device_name = "x".repeat(UINPUT_MAX_NAME_SIZE);
        assert!(config.validate().is_err());

        config.settings.device_name = "x".repeat(UINPUT_MAX_NAME_SIZE - 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_identical_paths() {
        let mut config = Config::default();
        config.settings.secondary_uinput_path = config.settings.primary_uinput_path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_toml("[settings\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = Config::load("configs/hydrajoy.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_or_default("/nonexistent/hydrajoy.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("hydrajoy-malformed-{}.toml", std::process::id()));
        std::fs::write(&path, "[settings]\npoll_period_ms = \"fast\"\n").unwrap();

        // The strict loader reports the error...
        assert!(matches!(Config::load_or_default(&path), Err(ConfigError::Parse(_))));
        // ...but startup only sees defaults
        assert_eq!(Config::load_or_warn(&path), Config::default());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("hydrajoy-invalid-{}.toml", std::process::id()));
        std::fs::write(&path, "[settings]\npoll_period_ms = 0\n").unwrap();

        assert_eq!(Config::load_or_warn(&path), Config::default());

        std::fs::remove_file(&path).unwrap();
    }
}
