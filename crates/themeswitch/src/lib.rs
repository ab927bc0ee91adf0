//! # Themeswitch - light/dark theme resolution
//!
//! Themeswitch decides which color palette an interface renders. It
//! reconciles the operating system's ambient appearance with the user's
//! explicit choice and notifies the render layer whenever the answer changes.
//!
//! ## Core concepts
//!
//! - [`ThemeResolver`]: owns the user's override and the latest ambient
//!   appearance, and derives a [`ResolvedTheme`] from them
//! - [`ThemeOverride`]: `Light`, `Dark`, or `FollowSystem` (the default)
//! - [`Appearance`]: the host's signal, which may be `Unknown`; unknown
//!   resolves to light
//! - [`AppearanceSource`]: where the ambient appearance comes from
//!   ([`HostAppearance`], [`SystemAppearance`], [`FixedAppearance`])
//! - [`Palette`]: a color per [`Role`], with the built-in
//!   [`LIGHT_PALETTE`] and [`DARK_PALETTE`]
//! - [`Subscription`]: a guard that deregisters a listener when dropped
//!
//! ## Quick start
//!
//! ```rust
//! use themeswitch::{Appearance, ColorScheme, HostAppearance, Role, ThemeResolver};
//!
//! // The platform glue keeps a handle and forwards appearance changes.
//! let host = HostAppearance::new(Appearance::Dark);
//! let resolver = ThemeResolver::new(&host);
//!
//! let _redraw = resolver.subscribe(|theme| {
//!     println!("background is now {}", theme.color(Role::Background));
//! });
//!
//! assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Dark);
//!
//! resolver.toggle();
//! assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Light);
//!
//! resolver.set_system_mode();
//! host.emit(Appearance::Light);
//! assert!(resolver.resolved_theme().is_following_system);
//! ```
//!
//! ## Operating system appearance
//!
//! [`SystemAppearance`] reads the OS color mode. Call
//! [`SystemAppearance::refresh`] when the host suspects the setting changed:
//!
//! ```rust,no_run
//! use themeswitch::{Config, ThemeResolver};
//!
//! let config = Config::from_env()?;
//! let system = config.system_appearance();
//! let resolver = ThemeResolver::new(&system);
//!
//! // later, e.g. on window focus
//! system.refresh();
//! # Ok::<(), themeswitch::ConfigError>(())
//! ```
//!
//! The override is held in memory only; it does not survive the resolver.

pub mod appearance;
pub mod config;
pub mod error;
pub mod palette;
pub mod resolver;
pub mod subscription;

pub use appearance::{
    os_appearance, Appearance, AppearanceDetector, AppearanceSource, ColorScheme,
    FixedAppearance, HostAppearance, SystemAppearance,
};
pub use config::{AppearanceSetting, Config, APPEARANCE_ENV_VAR};
pub use error::ConfigError;
pub use palette::{Color, Palette, Role, UnknownRole, DARK_PALETTE, LIGHT_PALETTE};
pub use resolver::{ResolvedTheme, ThemeOverride, ThemeResolver, UnknownOverride};
pub use subscription::Subscription;
