//! Sources driven directly by the embedding application.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::{Appearance, AppearanceSource, ColorScheme};
use crate::subscription::{Subscribers, Subscription};

struct HostInner {
    current: Cell<Appearance>,
    listeners: Subscribers<Appearance>,
}

/// An appearance source the host environment pushes changes into.
///
/// Wire the platform's appearance-change callback to [`HostAppearance::emit`].
/// Cloning yields another handle to the same source, so the platform glue
/// and the resolver can each hold one.
///
/// Every emit is delivered, in order, to every listener. Emits are not
/// coalesced: reporting the same appearance twice notifies twice.
///
/// # Example
///
/// ```rust
/// use themeswitch::{Appearance, ColorScheme, HostAppearance, ThemeResolver};
///
/// let host = HostAppearance::new(Appearance::Unknown);
/// let resolver = ThemeResolver::new(&host);
/// assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Light);
///
/// host.emit(Appearance::Dark);
/// assert_eq!(resolver.resolved_theme().scheme, ColorScheme::Dark);
/// ```
#[derive(Clone)]
pub struct HostAppearance {
    inner: Rc<HostInner>,
}

impl HostAppearance {
    /// Creates a source reporting `initial` until the first emit.
    pub fn new(initial: Appearance) -> Self {
        Self {
            inner: Rc::new(HostInner {
                current: Cell::new(initial),
                listeners: Subscribers::new(),
            }),
        }
    }

    /// Records a new appearance and delivers it to every listener.
    pub fn emit(&self, appearance: Appearance) {
        let previous = self.inner.current.replace(appearance);
        debug!(
            from = %previous,
            to = %appearance,
            listeners = self.inner.listeners.len(),
            "host appearance changed"
        );
        self.inner.listeners.notify(&appearance);
    }

    /// Emits a platform value in the nullable-scheme shape most hosts use.
    pub fn emit_scheme(&self, scheme: Option<ColorScheme>) {
        self.emit(Appearance::from(scheme));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

impl Default for HostAppearance {
    fn default() -> Self {
        Self::new(Appearance::Unknown)
    }
}

impl AppearanceSource for HostAppearance {
    fn current(&self) -> Appearance {
        self.inner.current.get()
    }

    fn subscribe(&self, listener: Box<dyn Fn(Appearance)>) -> Subscription {
        self.inner
            .listeners
            .subscribe(move |appearance: &Appearance| listener(*appearance))
    }
}

impl fmt::Debug for HostAppearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostAppearance")
            .field("current", &self.inner.current.get())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

/// A source whose appearance never changes.
///
/// Suits platforms without an appearance API (`FixedAppearance(Appearance::Unknown)`)
/// and tests that pin the ambient signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedAppearance(pub Appearance);

impl AppearanceSource for FixedAppearance {
    fn current(&self) -> Appearance {
        self.0
    }

    fn subscribe(&self, _listener: Box<dyn Fn(Appearance)>) -> Subscription {
        Subscription::noop()
    }
}
