use alloc::sync::{Arc, Weak};
use core::fmt;

use crate::util::Unquote;
use crate::{Flag, FlagListener, IntoDynListener, Listener, ListenerError, Source, Subscription};

// -------------------------------------------------------------------------------------------------

/// Consumer-side binding to a [`Source`]: subscribes once when activated, and unsubscribes
/// exactly once when deactivated or dropped.
///
/// This is the shape a rendering framework, a polling loop, or any other consumer wants:
/// it reads the [`snapshot()`](Self::snapshot) whenever it needs one (any number of times,
/// with no side effects), and asks [`take_changed()`](Self::take_changed) whether a change
/// has been published since it last looked.
///
/// # Example
///
/// ```
/// use tidings::{Bridge, unsync::Store};
///
/// let store = Store::new("light");
/// let bridge = Bridge::activate(store.as_source());
///
/// assert_eq!(bridge.snapshot(), "light");
/// assert_eq!(bridge.take_changed(), None);
///
/// store.publish("dark");
/// assert_eq!(bridge.take_changed(), Some("dark"));
/// assert_eq!(bridge.take_changed(), None);
/// ```
pub struct Bridge<S> {
    source: S,
    flag: Flag,
    subscription: Option<Subscription>,
}

impl<S: Source> Bridge<S> {
    /// Subscribes to `source` and returns a bridge which is active.
    #[must_use]
    pub fn activate(source: S) -> Self
    where
        FlagListener: IntoDynListener<S::Listener>,
    {
        let flag = Flag::new(false);
        let subscription = source.subscribe(flag.listener());
        Self {
            source,
            flag,
            subscription: Some(subscription),
        }
    }

    /// Returns the source's current snapshot.
    ///
    /// This is a pure read; it does not consume the pending-change indication.
    #[must_use]
    pub fn snapshot(&self) -> S::Value {
        self.source.snapshot()
    }

    /// If a change has been published since the last call (or since activation), returns
    /// the current snapshot and clears the indication. Otherwise returns [`None`].
    ///
    /// Several changes published between calls are reported once, with the newest snapshot.
    #[allow(clippy::must_use_candidate)]
    pub fn take_changed(&self) -> Option<S::Value> {
        self.flag
            .get_and_clear()
            .then(|| self.source.snapshot())
    }

    /// Returns whether this bridge is still subscribed to its source.
    ///
    /// This becomes false after [`deactivate()`](Self::deactivate), and also when the source
    /// itself ends all subscriptions, such as when its [`Store`](crate::Store) is dropped.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Unsubscribes from the source. Calling this more than once has no further effect.
    ///
    /// The bridge can still be used to read snapshots afterward.
    pub fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Returns the source this bridge reads from.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<Src: Source + ?Sized> Bridge<Arc<Src>> {
    /// Returns a bridge which, whenever the source changes, reads the new snapshot and passes
    /// it to `refresh` right away, instead of waiting to be asked.
    ///
    /// This suits consumers which must be pushed updates, such as a UI framework's
    /// "please redraw" hook. [`take_changed()`](Self::take_changed) still works alongside.
    ///
    /// `refresh` runs inside change notification, so it must obey the rules in
    /// [`Listener::changed()`]. The listener holds only a weak reference to the source, so
    /// the subscription does not keep the source alive.
    ///
    /// ```
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use tidings::{Bridge, unsync::Store};
    ///
    /// let store = Store::new(0);
    /// let seen = Rc::new(Cell::new(None));
    /// let bridge = Bridge::with_refresh(store.as_source(), {
    ///     let seen = seen.clone();
    ///     move |value: i32| seen.set(Some(value))
    /// });
    ///
    /// store.publish(5);
    /// assert_eq!(seen.get(), Some(5));
    /// # drop(bridge);
    /// ```
    #[must_use]
    pub fn with_refresh<F>(source: Arc<Src>, refresh: F) -> Self
    where
        F: Fn(Src::Value),
        RefreshListener<Src, F>: IntoDynListener<Src::Listener>,
    {
        let flag = Flag::new(false);
        let subscription = source.subscribe_raw(
            RefreshListener {
                source: Arc::downgrade(&source),
                refresh,
                flag: flag.listener(),
            }
            .into_dyn_listener(),
        );
        Self {
            source,
            flag,
            subscription: Some(subscription),
        }
    }
}

impl<S> Drop for Bridge<S> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Bridge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("source", &self.source)
            .field("flag", &self.flag)
            .field("subscription", &self.subscription)
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------

/// [`Bridge::with_refresh()`] implementation.
pub struct RefreshListener<Src: ?Sized, F> {
    source: Weak<Src>,
    refresh: F,
    flag: FlagListener,
}

impl<Src, F> Listener for RefreshListener<Src, F>
where
    Src: Source + ?Sized,
    F: Fn(Src::Value),
{
    fn changed(&self) -> Result<(), ListenerError> {
        self.flag.changed()?;
        if let Some(source) = self.source.upgrade() {
            (self.refresh)(source.snapshot());
        }
        Ok(())
    }
}

impl<Src: ?Sized, F> fmt::Debug for RefreshListener<Src, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshListener")
            .field("source_alive", &(self.source.strong_count() > 0))
            .field("refresh", &Unquote::type_name::<F>())
            .field("flag", &self.flag)
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
