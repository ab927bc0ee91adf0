//! Scoped subscriptions and the subscriber registry behind them.
//!
//! Every listener registration in this crate hands back a [`Subscription`].
//! The guard owns the release action for that registration and runs it
//! exactly once, either when [`Subscription::release`] is called or when the
//! guard is dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

/// Guard for a registered listener.
///
/// Dropping the guard deregisters the listener. Keep it alive for as long
/// as the listener should receive notifications.
///
/// # Example
///
/// ```rust
/// use themeswitch::{Appearance, AppearanceSource, HostAppearance};
///
/// let host = HostAppearance::new(Appearance::Light);
/// let subscription = host.subscribe(Box::new(|appearance: Appearance| {
///     println!("appearance is now {appearance}");
/// }));
/// assert_eq!(host.listener_count(), 1);
///
/// drop(subscription);
/// assert_eq!(host.listener_count(), 0);
/// ```
#[must_use = "dropping a Subscription immediately deregisters its listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Creates a guard that runs `release` once when released or dropped.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release, for sources that never notify.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Returns `true` until the release action has run.
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Deregisters the listener now rather than at drop.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

type Callback<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// Ordered list of callbacks sharing one notification type.
///
/// Cloning yields another handle to the same list.
pub(crate) struct Subscribers<T> {
    inner: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Subscribers<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Appends `callback` and returns the guard that removes it again.
    pub(crate) fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(callback);
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, callback));
            id
        };
        trace!(id, "listener registered");

        let registry: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            // The callback is dropped after the borrow ends; it may own
            // guards that release into this same registry.
            let removed = {
                let mut registry = registry.borrow_mut();
                registry
                    .entries
                    .iter()
                    .position(|(entry, _)| *entry == id)
                    .map(|index| registry.entries.remove(index))
            };
            drop(removed);
            trace!(id, "listener released");
        })
    }

    /// Invokes every callback with `value`, in registration order.
    ///
    /// The registry is not borrowed while callbacks run, so a callback may
    /// subscribe, release, or trigger a nested notification. Callbacks added
    /// during the pass wait for the next one; callbacks released during the
    /// pass are skipped.
    pub(crate) fn notify(&self, value: &T) {
        let callbacks: Vec<(u64, Callback<T>)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();

        for (id, callback) in callbacks {
            if self.is_registered(id) {
                callback(value);
            }
        }
    }

    fn is_registered(&self, id: u64) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|(entry, _)| *entry == id)
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.inner.borrow().entries.len())
            .finish()
    }
}
