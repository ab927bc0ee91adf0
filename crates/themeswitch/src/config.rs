//! Configuration of the ambient appearance source.
//!
//! Configuration only chooses where the ambient appearance comes from. The
//! override always starts at follow-system and an unknown appearance always
//! resolves to light.
//!
//! # YAML
//!
//! ```yaml
//! appearance: dark   # auto | light | dark | unknown
//! ```
//!
//! # Environment
//!
//! `THEMESWITCH_APPEARANCE` takes the same values.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::appearance::{os_appearance, Appearance, AppearanceDetector, SystemAppearance};
use crate::error::ConfigError;

/// Environment variable read by [`Config::from_env`].
pub const APPEARANCE_ENV_VAR: &str = "THEMESWITCH_APPEARANCE";

/// Where the ambient appearance comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppearanceSetting {
    /// Ask the operating system.
    #[default]
    Auto,
    /// Pin the ambient appearance to light.
    Light,
    /// Pin the ambient appearance to dark.
    Dark,
    /// Report no appearance, as a platform without an appearance API would.
    Unknown,
}

impl AppearanceSetting {
    pub fn as_str(self) -> &'static str {
        match self {
            AppearanceSetting::Auto => "auto",
            AppearanceSetting::Light => "light",
            AppearanceSetting::Dark => "dark",
            AppearanceSetting::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AppearanceSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppearanceSetting {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(AppearanceSetting::Auto),
            "light" => Ok(AppearanceSetting::Light),
            "dark" => Ok(AppearanceSetting::Dark),
            "unknown" => Ok(AppearanceSetting::Unknown),
            _ => Err(ConfigError::InvalidAppearance(s.to_string())),
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub appearance: AppearanceSetting,
}

impl Config {
    /// Parses YAML configuration text.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&source)?;
        debug!(path = %path.display(), appearance = %config.appearance, "loaded theme config");
        Ok(config)
    }

    /// Builds a configuration from [`APPEARANCE_ENV_VAR`].
    ///
    /// An unset or empty variable yields the default configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(APPEARANCE_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => Ok(Self {
                appearance: value.parse()?,
            }),
            _ => Ok(Self::default()),
        }
    }

    /// The detector matching the configured setting.
    pub fn detector(&self) -> AppearanceDetector {
        match self.appearance {
            AppearanceSetting::Auto => os_appearance,
            AppearanceSetting::Light => || Appearance::Light,
            AppearanceSetting::Dark => || Appearance::Dark,
            AppearanceSetting::Unknown => || Appearance::Unknown,
        }
    }

    /// A system appearance source using the configured detector.
    pub fn system_appearance(&self) -> SystemAppearance {
        SystemAppearance::with_detector(self.detector())
    }
}
