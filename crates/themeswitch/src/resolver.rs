//! Theme resolution from the user's override and the ambient appearance.
//!
//! [`ThemeResolver`] is the single source of truth for which palette is
//! active. Precedence is fixed:
//!
//! 1. An explicit [`ThemeOverride::Light`] or [`ThemeOverride::Dark`] wins.
//! 2. Under [`ThemeOverride::FollowSystem`] the ambient [`Appearance`] decides.
//! 3. An [`Appearance::Unknown`] ambient signal resolves to light.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::appearance::{Appearance, AppearanceSource, ColorScheme};
use crate::palette::{Color, Palette, Role};
use crate::subscription::{Subscribers, Subscription};

/// The user's explicit theme choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThemeOverride {
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "dark")]
    Dark,
    /// No override; the ambient appearance decides.
    #[default]
    #[serde(rename = "system")]
    FollowSystem,
}

impl ThemeOverride {
    /// The forced scheme, or `None` when following the system.
    pub fn scheme(self) -> Option<ColorScheme> {
        match self {
            ThemeOverride::Light => Some(ColorScheme::Light),
            ThemeOverride::Dark => Some(ColorScheme::Dark),
            ThemeOverride::FollowSystem => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeOverride::Light => "light",
            ThemeOverride::Dark => "dark",
            ThemeOverride::FollowSystem => "system",
        }
    }
}

impl From<ColorScheme> for ThemeOverride {
    fn from(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => ThemeOverride::Light,
            ColorScheme::Dark => ThemeOverride::Dark,
        }
    }
}

impl fmt::Display for ThemeOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized override name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme override '{0}' (expected light, dark or system)")]
pub struct UnknownOverride(pub String);

impl FromStr for ThemeOverride {
    type Err = UnknownOverride;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeOverride::Light),
            "dark" => Ok(ThemeOverride::Dark),
            "system" => Ok(ThemeOverride::FollowSystem),
            other => Err(UnknownOverride(other.to_string())),
        }
    }
}

/// The effective theme at one instant.
///
/// `colors` is always one of the two built-in palettes; equality compares
/// it by identity.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResolvedTheme {
    #[serde(rename = "activeScheme")]
    pub scheme: ColorScheme,
    pub colors: &'static Palette,
    #[serde(rename = "isFollowingSystem")]
    pub is_following_system: bool,
}

impl ResolvedTheme {
    /// Resolves a theme from an override and an ambient appearance.
    pub fn resolve(theme_override: ThemeOverride, appearance: Appearance) -> Self {
        let scheme = theme_override
            .scheme()
            .unwrap_or_else(|| appearance.scheme_or_default());
        Self {
            scheme,
            colors: Palette::for_scheme(scheme),
            is_following_system: theme_override == ThemeOverride::FollowSystem,
        }
    }

    /// Shorthand for `self.colors.get(role)`.
    pub fn color(&self, role: Role) -> Color {
        self.colors.get(role)
    }

    pub fn is_dark(&self) -> bool {
        self.scheme == ColorScheme::Dark
    }
}

impl PartialEq for ResolvedTheme {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && std::ptr::eq(self.colors, other.colors)
            && self.is_following_system == other.is_following_system
    }
}

impl Eq for ResolvedTheme {}

#[derive(Debug)]
struct ResolverState {
    theme_override: ThemeOverride,
    appearance: Appearance,
    version: u64,
}

impl ResolverState {
    fn resolved(&self) -> ResolvedTheme {
        ResolvedTheme::resolve(self.theme_override, self.appearance)
    }
}

struct Shared {
    state: RefCell<ResolverState>,
    observers: Subscribers<ResolvedTheme>,
    delivering: Cell<bool>,
}

impl Shared {
    /// Applies `mutate` and notifies observers if the resolved theme changed.
    ///
    /// A change made while observers are being notified is not delivered
    /// from inside that pass. The outer pass finishes with the theme it
    /// started, then delivers the latest state, so every observer sees the
    /// current theme last.
    fn transition(&self, mutate: impl FnOnce(&mut ResolverState)) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let before = state.resolved();
            mutate(&mut *state);
            if before == state.resolved() {
                false
            } else {
                state.version += 1;
                true
            }
        };

        if !changed || self.delivering.replace(true) {
            return;
        }

        let mut delivered: Option<(u64, ResolvedTheme)> = None;
        loop {
            let (version, theme) = {
                let state = self.state.borrow();
                (state.version, state.resolved())
            };
            match delivered {
                Some((seen, _)) if seen == version => break,
                // Nested changes that landed back on the delivered theme.
                Some((_, last)) if last == theme => break,
                _ => {}
            }
            delivered = Some((version, theme));
            self.observers.notify(&theme);
        }
        self.delivering.set(false);
    }
}

/// Resolves the active theme and tracks changes to it.
///
/// A resolver reads its source's appearance once on construction and keeps
/// one listener registered with the source until it is dropped. The override
/// starts at [`ThemeOverride::FollowSystem`] and only the mutators change it;
/// it is not persisted.
///
/// Resolvers are independent: several may share one source without
/// affecting each other's override.
///
/// # Example
///
/// ```rust
/// use themeswitch::{Appearance, ColorScheme, HostAppearance, ThemeResolver, DARK_PALETTE};
///
/// let host = HostAppearance::new(Appearance::Dark);
/// let resolver = ThemeResolver::new(&host);
///
/// let theme = resolver.resolved_theme();
/// assert_eq!(theme.scheme, ColorScheme::Dark);
/// assert!(std::ptr::eq(theme.colors, &DARK_PALETTE));
/// assert!(theme.is_following_system);
///
/// resolver.set_light_mode();
/// assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Light);
/// assert!(!resolver.is_following_system());
/// ```
pub struct ThemeResolver {
    shared: Rc<Shared>,
    _source_subscription: Subscription,
}

impl ThemeResolver {
    /// Creates a resolver seeded from `source` and subscribed to its changes.
    pub fn new<S: AppearanceSource + ?Sized>(source: &S) -> Self {
        let appearance = source.current();
        let shared = Rc::new(Shared {
            state: RefCell::new(ResolverState {
                theme_override: ThemeOverride::FollowSystem,
                appearance,
                version: 0,
            }),
            observers: Subscribers::new(),
            delivering: Cell::new(false),
        });

        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let subscription = source.subscribe(Box::new(move |appearance: Appearance| {
            if let Some(shared) = weak.upgrade() {
                debug!(%appearance, "appearance notification");
                shared.transition(|state| state.appearance = appearance);
            }
        }));
        debug!(%appearance, "theme resolver attached");

        Self {
            shared,
            _source_subscription: subscription,
        }
    }

    /// The theme to render right now.
    pub fn resolved_theme(&self) -> ResolvedTheme {
        self.shared.state.borrow().resolved()
    }

    /// The current override.
    pub fn theme_override(&self) -> ThemeOverride {
        self.shared.state.borrow().theme_override
    }

    /// The last appearance reported by the source.
    pub fn appearance(&self) -> Appearance {
        self.shared.state.borrow().appearance
    }

    pub fn is_following_system(&self) -> bool {
        self.theme_override() == ThemeOverride::FollowSystem
    }

    /// Replaces the override.
    pub fn set_override(&self, theme_override: ThemeOverride) {
        self.shared.transition(|state| {
            if state.theme_override != theme_override {
                debug!(
                    from = %state.theme_override,
                    to = %theme_override,
                    "theme override changed"
                );
                state.theme_override = theme_override;
            }
        });
    }

    pub fn set_light_mode(&self) {
        self.set_override(ThemeOverride::Light);
    }

    pub fn set_dark_mode(&self) {
        self.set_override(ThemeOverride::Dark);
    }

    /// Drops the override and follows the ambient appearance again.
    pub fn set_system_mode(&self) {
        self.set_override(ThemeOverride::FollowSystem);
    }

    /// Flips between light and dark.
    ///
    /// From an explicit override this swaps it. While following the system
    /// it sets the override opposite to the ambient appearance, treating an
    /// unknown appearance as light. Toggling never returns to
    /// [`ThemeOverride::FollowSystem`].
    pub fn toggle(&self) {
        let next = {
            let state = self.shared.state.borrow();
            match state.theme_override {
                ThemeOverride::Dark => ThemeOverride::Light,
                ThemeOverride::Light => ThemeOverride::Dark,
                ThemeOverride::FollowSystem => {
                    ThemeOverride::from(state.appearance.scheme_or_default().opposite())
                }
            }
        };
        self.set_override(next);
    }

    /// Registers `observer` to receive every new resolved theme.
    ///
    /// Observers run in registration order after each change, and only when
    /// the resolved theme actually differs from the previous one.
    pub fn subscribe(&self, observer: impl Fn(&ResolvedTheme) + 'static) -> Subscription {
        self.shared.observers.subscribe(observer)
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.shared.observers.len()
    }

    /// Increments once per resolved-theme change.
    pub fn version(&self) -> u64 {
        self.shared.state.borrow().version
    }
}

impl fmt::Debug for ThemeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("ThemeResolver")
            .field("theme_override", &state.theme_override)
            .field("appearance", &state.appearance)
            .field("version", &state.version)
            .field("observers", &self.shared.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::{FixedAppearance, HostAppearance};
    use crate::palette::{DARK_PALETTE, LIGHT_PALETTE};

    fn resolver_with(appearance: Appearance) -> (HostAppearance, ThemeResolver) {
        let host = HostAppearance::new(appearance);
        let resolver = ThemeResolver::new(&host);
        (host, resolver)
    }

    #[test]
    fn test_starts_following_system() {
        let (_host, resolver) = resolver_with(Appearance::Light);
        assert_eq!(resolver.theme_override(), ThemeOverride::FollowSystem);
        assert!(resolver.resolved_theme().is_following_system);
    }

    #[test]
    fn test_explicit_override_ignores_appearance() {
        for appearance in [Appearance::Light, Appearance::Dark, Appearance::Unknown] {
            let (_host, resolver) = resolver_with(appearance);

            resolver.set_light_mode();
            assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Light);

            resolver.set_dark_mode();
            assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Dark);
        }
    }

    #[test]
    fn test_follows_appearance() {
        let (host, resolver) = resolver_with(Appearance::Dark);
        assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Dark);

        host.emit(Appearance::Light);
        assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Light);

        host.emit(Appearance::Unknown);
        assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Light);
        assert_eq!(resolver.appearance(), Appearance::Unknown);
    }

    #[test]
    fn test_colors_track_scheme_by_identity() {
        let (_host, resolver) = resolver_with(Appearance::Dark);
        assert!(std::ptr::eq(resolver.resolved_theme().colors, &DARK_PALETTE));

        resolver.set_light_mode();
        assert!(std::ptr::eq(resolver.resolved_theme().colors, &LIGHT_PALETTE));
    }

    #[test]
    fn test_toggle_from_explicit_override() {
        let (_host, resolver) = resolver_with(Appearance::Light);

        resolver.set_dark_mode();
        resolver.toggle();
        assert_eq!(resolver.theme_override(), ThemeOverride::Light);
        resolver.toggle();
        assert_eq!(resolver.theme_override(), ThemeOverride::Dark);
    }

    #[test]
    fn test_toggle_from_follow_system() {
        let cases = [
            (Appearance::Dark, ThemeOverride::Light),
            (Appearance::Light, ThemeOverride::Dark),
            (Appearance::Unknown, ThemeOverride::Dark),
        ];
        for (appearance, expected) in cases {
            let (_host, resolver) = resolver_with(appearance);
            resolver.toggle();
            assert_eq!(resolver.theme_override(), expected, "from {appearance}");
            assert!(!resolver.is_following_system());
        }
    }

    #[test]
    fn test_system_mode_reads_latest_appearance() {
        let (host, resolver) = resolver_with(Appearance::Light);
        resolver.set_dark_mode();
        resolver.set_system_mode();
        host.emit(Appearance::Dark);

        let theme = resolver.resolved_theme();
        assert_eq!(theme.scheme, ColorScheme::Dark);
        assert!(theme.is_following_system);
    }

    #[test]
    fn test_appearance_tracked_under_override() {
        let (host, resolver) = resolver_with(Appearance::Light);
        resolver.set_light_mode();
        host.emit(Appearance::Dark);

        assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Light);
        resolver.set_system_mode();
        assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Dark);
    }

    #[test]
    fn test_idempotent_mutators_do_not_notify() {
        let (_host, resolver) = resolver_with(Appearance::Dark);
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let _subscription = resolver.subscribe(move |_| counter.set(counter.get() + 1));

        resolver.set_light_mode();
        resolver.set_light_mode();
        assert_eq!(count.get(), 1);
        assert_eq!(resolver.version(), 1);

        resolver.set_system_mode();
        resolver.set_system_mode();
        assert_eq!(count.get(), 2);
        assert_eq!(resolver.version(), 2);
    }

    #[test]
    fn test_observers_see_appearance_changes() {
        let (host, resolver) = resolver_with(Appearance::Light);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = resolver.subscribe(move |theme| sink.borrow_mut().push(theme.scheme));

        host.emit(Appearance::Dark);
        host.emit(Appearance::Dark);
        host.emit(Appearance::Light);

        assert_eq!(*seen.borrow(), vec![ColorScheme::Dark, ColorScheme::Light]);
    }

    #[test]
    fn test_appearance_change_under_override_is_silent() {
        let (host, resolver) = resolver_with(Appearance::Light);
        resolver.set_dark_mode();
        let version = resolver.version();

        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let _subscription = resolver.subscribe(move |_| counter.set(counter.get() + 1));

        host.emit(Appearance::Dark);
        assert_eq!(count.get(), 0);
        assert_eq!(resolver.version(), version);
    }

    #[test]
    fn test_dropped_observer_is_not_called() {
        let (_host, resolver) = resolver_with(Appearance::Light);
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let subscription = resolver.subscribe(move |_| counter.set(counter.get() + 1));
        assert_eq!(resolver.observer_count(), 1);

        drop(subscription);
        resolver.set_dark_mode();
        assert_eq!(count.get(), 0);
        assert_eq!(resolver.observer_count(), 0);
    }

    #[test]
    fn test_observer_may_query_resolver() {
        let (host, resolver) = resolver_with(Appearance::Light);
        let resolver = Rc::new(resolver);
        let seen = Rc::new(Cell::new(None));

        let handle = Rc::downgrade(&resolver);
        let sink = Rc::clone(&seen);
        let _subscription = resolver.subscribe(move |_| {
            if let Some(resolver) = handle.upgrade() {
                sink.set(Some(resolver.theme_override()));
            }
        });

        host.emit(Appearance::Dark);
        assert_eq!(seen.get(), Some(ThemeOverride::FollowSystem));
    }

    #[test]
    fn test_observer_mutation_is_delivered_last() {
        let (host, resolver) = resolver_with(Appearance::Light);
        let resolver = Rc::new(resolver);

        let handle = Rc::downgrade(&resolver);
        let _force_light = resolver.subscribe(move |theme| {
            if theme.is_dark() {
                if let Some(resolver) = handle.upgrade() {
                    resolver.set_light_mode();
                }
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _record = resolver.subscribe(move |theme| sink.borrow_mut().push(theme.scheme));

        host.emit(Appearance::Dark);

        assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Light);
        assert_eq!(*seen.borrow(), vec![ColorScheme::Dark, ColorScheme::Light]);
        assert_eq!(seen.borrow().last(), Some(&resolver.resolved_theme().scheme));
    }

    #[test]
    fn test_nested_change_back_to_delivered_theme_is_not_repeated() {
        let (_host, resolver) = resolver_with(Appearance::Light);
        let resolver = Rc::new(resolver);

        let handle = Rc::downgrade(&resolver);
        let _flip_back = resolver.subscribe(move |theme| {
            if let Some(resolver) = handle.upgrade() {
                if theme.scheme == ColorScheme::Dark && !theme.is_following_system {
                    resolver.set_light_mode();
                    resolver.set_dark_mode();
                }
            }
        });
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let _record = resolver.subscribe(move |_| counter.set(counter.get() + 1));

        resolver.set_dark_mode();

        assert_eq!(count.get(), 1);
        assert_eq!(resolver.theme_override(), ThemeOverride::Dark);
    }

    #[test]
    fn test_observer_released_during_delivery_is_not_called() {
        let (_host, resolver) = resolver_with(Appearance::Light);
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let victim = Rc::clone(&slot);
        let _first = resolver.subscribe(move |_| {
            let released = victim.borrow_mut().take();
            drop(released);
        });
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        *slot.borrow_mut() = Some(resolver.subscribe(move |_| counter.set(counter.get() + 1)));

        resolver.set_dark_mode();

        assert_eq!(count.get(), 0);
        assert_eq!(resolver.observer_count(), 1);
    }

    #[test]
    fn test_drop_releases_source_listener() {
        let host = HostAppearance::new(Appearance::Light);
        let resolver = ThemeResolver::new(&host);
        assert_eq!(host.listener_count(), 1);

        drop(resolver);
        assert_eq!(host.listener_count(), 0);
        host.emit(Appearance::Dark);
    }

    #[test]
    fn test_resolvers_are_independent() {
        let host = HostAppearance::new(Appearance::Dark);
        let a = ThemeResolver::new(&host);
        let b = ThemeResolver::new(&host);

        a.set_light_mode();
        assert_eq!(a.resolved_theme().scheme, ColorScheme::Light);
        assert_eq!(b.resolved_theme().scheme, ColorScheme::Dark);
        assert_eq!(host.listener_count(), 2);
    }

    #[test]
    fn test_fixed_source() {
        let resolver = ThemeResolver::new(&FixedAppearance(Appearance::Unknown));
        let theme = resolver.resolved_theme();
        assert_eq!(theme.scheme, ColorScheme::Light);
        assert!(theme.is_following_system);
    }

    #[test]
    fn test_override_parse_and_display() {
        assert_eq!("system".parse::<ThemeOverride>(), Ok(ThemeOverride::FollowSystem));
        assert_eq!("dark".parse::<ThemeOverride>(), Ok(ThemeOverride::Dark));
        assert_eq!(ThemeOverride::FollowSystem.to_string(), "system");

        let err = "auto".parse::<ThemeOverride>().unwrap_err();
        assert_eq!(err, UnknownOverride("auto".to_string()));
        assert!(err.to_string().contains("expected light, dark or system"));
    }

    #[test]
    fn test_resolved_theme_serialization() {
        let theme = ResolvedTheme::resolve(ThemeOverride::FollowSystem, Appearance::Dark);
        let value = serde_json::to_value(theme).unwrap();

        assert_eq!(value["activeScheme"], "dark");
        assert_eq!(value["isFollowingSystem"], true);
        assert_eq!(value["colors"]["background"], DARK_PALETTE.background.as_str());
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_logs_override_transition() {
        let (_host, resolver) = resolver_with(Appearance::Light);
        resolver.set_dark_mode();
        assert!(logs_contain("theme override changed"));
    }
}
