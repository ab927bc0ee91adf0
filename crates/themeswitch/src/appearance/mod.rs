//! Ambient appearance reported by the host environment.
//!
//! This module provides:
//!
//! - [`Appearance`]: the host's light/dark signal, which may be unknown
//! - [`ColorScheme`]: a concrete light or dark scheme
//! - [`AppearanceSource`]: the seam through which a resolver reads and
//!   subscribes to the ambient appearance
//! - [`HostAppearance`], [`FixedAppearance`], [`SystemAppearance`]: sources

mod host;
mod system;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::subscription::Subscription;

pub use host::{FixedAppearance, HostAppearance};
pub use system::{os_appearance, AppearanceDetector, SystemAppearance};

/// A concrete color scheme. Resolved themes always carry one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ColorScheme {
    /// The other scheme.
    pub fn opposite(self) -> Self {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The appearance the host environment currently reports.
///
/// `Unknown` covers hosts that cannot report a scheme, including the window
/// at cold start before the first report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
    #[default]
    Unknown,
}

impl Appearance {
    /// The reported scheme, if any.
    pub fn scheme(self) -> Option<ColorScheme> {
        match self {
            Appearance::Light => Some(ColorScheme::Light),
            Appearance::Dark => Some(ColorScheme::Dark),
            Appearance::Unknown => None,
        }
    }

    /// The reported scheme, with `Unknown` falling back to light.
    pub fn scheme_or_default(self) -> ColorScheme {
        self.scheme().unwrap_or(ColorScheme::Light)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
            Appearance::Unknown => "unknown",
        }
    }
}

impl From<ColorScheme> for Appearance {
    fn from(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => Appearance::Light,
            ColorScheme::Dark => Appearance::Dark,
        }
    }
}

impl From<Option<ColorScheme>> for Appearance {
    fn from(scheme: Option<ColorScheme>) -> Self {
        scheme.map_or(Appearance::Unknown, Appearance::from)
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider of the ambient appearance.
///
/// `current` is polled once when a resolver is created; afterwards the
/// resolver relies on the listener registered through `subscribe`.
/// Listeners must be invoked in the order the host emits changes.
pub trait AppearanceSource {
    /// The appearance reported right now.
    fn current(&self) -> Appearance;

    /// Registers `listener` for appearance changes.
    ///
    /// The listener stays registered until the returned guard is released
    /// or dropped.
    fn subscribe(&self, listener: Box<dyn Fn(Appearance)>) -> Subscription;
}
