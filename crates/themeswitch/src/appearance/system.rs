//! Appearance source backed by the operating system's color mode.

use std::fmt;

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use tracing::debug;

use super::{Appearance, AppearanceSource, HostAppearance};
use crate::subscription::Subscription;

/// Function used to read the ambient appearance.
///
/// Swap it out for testing or to pin a specific mode.
pub type AppearanceDetector = fn() -> Appearance;

/// Queries the operating system through `dark-light`.
pub fn os_appearance() -> Appearance {
    match detect_os_theme() {
        OsThemeMode::Dark => Appearance::Dark,
        OsThemeMode::Light => Appearance::Light,
    }
}

/// An appearance source that reads the operating system's color mode.
///
/// The OS is queried once at construction. Platforms do not share a push
/// API for appearance changes, so the host calls [`SystemAppearance::refresh`]
/// when it learns the settings may have changed (window focus, a settings
/// event, or a timer). A refresh that observes a new value notifies
/// listeners; one that observes the same value does not.
///
/// # Example
///
/// ```rust
/// use themeswitch::{Appearance, AppearanceSource, SystemAppearance};
///
/// let system = SystemAppearance::with_detector(|| Appearance::Dark);
/// assert_eq!(system.current(), Appearance::Dark);
/// ```
#[derive(Clone)]
pub struct SystemAppearance {
    host: HostAppearance,
    detector: AppearanceDetector,
}

impl SystemAppearance {
    /// Creates a source reading the OS color mode.
    pub fn new() -> Self {
        Self::with_detector(os_appearance)
    }

    /// Creates a source reading the appearance from `detector`.
    pub fn with_detector(detector: AppearanceDetector) -> Self {
        Self {
            host: HostAppearance::new(detector()),
            detector,
        }
    }

    /// Re-runs the detector and notifies listeners if the value changed.
    ///
    /// Returns the freshly detected appearance.
    pub fn refresh(&self) -> Appearance {
        let detected = (self.detector)();
        if detected != self.host.current() {
            debug!(appearance = %detected, "system appearance changed");
            self.host.emit(detected);
        }
        detected
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.host.listener_count()
    }
}

impl Default for SystemAppearance {
    fn default() -> Self {
        Self::new()
    }
}

impl AppearanceSource for SystemAppearance {
    fn current(&self) -> Appearance {
        self.host.current()
    }

    fn subscribe(&self, listener: Box<dyn Fn(Appearance)>) -> Subscription {
        self.host.subscribe(listener)
    }
}

impl fmt::Debug for SystemAppearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemAppearance")
            .field("current", &self.host.current())
            .field("listeners", &self.host.listener_count())
            .finish_non_exhaustive()
    }
}
