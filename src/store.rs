#![allow(
    clippy::module_name_repetitions,
    reason = "types are re-exported at the crate root"
)]

use alloc::sync::{Arc, Weak};
use core::{fmt, mem};

use crate::maybe_sync::Mutex;
use crate::{Listener, Notifier, Reporter, Source, Subscription};

#[cfg(doc)]
use crate::{sync, unsync};

// -------------------------------------------------------------------------------------------------

/// Holder of the current snapshot of some externally-owned state, which notifies
/// its subscribers whenever the snapshot is replaced.
///
/// The `Store` itself is the *writing* side; it is usually owned by whatever translates
/// external events into new snapshots, such as a
/// [`ConnectivityAdapter`](crate::ConnectivityAdapter).
/// Consumers are given the *reading* side, [`Store::as_source()`], through which they can
/// read the snapshot and subscribe to changes.
///
/// A snapshot is never modified in place: every publish replaces it with a new value.
/// Reading it clones the value, so if the clone is not cheap,
/// consider wrapping the value with [`Arc`] to reduce the cost to reference count changes.
///
/// When the `Store` is dropped, its listeners are dropped too, since no further change can
/// ever happen; outstanding sources keep returning the last snapshot.
///
/// # Generic parameters
///
/// * `T` is the type of the snapshot.
/// * `L` is the type of [`Listener`] this store accepts,
///   usually a trait object type such as [`sync::DynListener`].
///
/// We recommend that you use the type aliases [`sync::Store`] or [`unsync::Store`],
/// to avoid writing the type parameter `L` outside of special cases.
pub struct Store<T, L> {
    /// Access to the state this store shares with all sources.
    /// Publicly, only `Store` can be used to replace the snapshot.
    shared: Arc<StoreSource<T, L>>,
}

/// [`Store::as_source()`] implementation.
///
/// This type can be coerced to `dyn Source`.
///
/// # Generic parameters
///
/// * `T` is the type of the snapshot.
/// * `L` is the type of [`Listener`] this source accepts,
///   usually a trait object type such as [`sync::DynListener`].
//---
// Design note: Despite being public, this also serves as the internal shared data structure
// between `Store` and its sources, so that `Arc<StoreSource>` can be coerced to
// `Arc<dyn Source>` without another layer of indirection.
pub struct StoreSource<T, L> {
    value_mutex: Mutex<T>,
    notifier: Notifier<L>,
}

// -------------------------------------------------------------------------------------------------

impl<T: Clone, L: Listener + Clone> Store<T, L> {
    /// Creates a new [`Store`] whose snapshot is `initial`.
    ///
    /// Listener failures are reported with [`report_with_tracing()`](crate::report_with_tracing).
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self::with_notifier(initial, Notifier::new())
    }

    /// Creates a new [`Store`] whose snapshot is `initial`, and which passes listener failures
    /// to `reporter`.
    #[must_use]
    pub fn with_reporter(initial: T, reporter: Reporter) -> Self {
        Self::with_notifier(initial, Notifier::with_reporter(reporter))
    }

    fn with_notifier(initial: T, notifier: Notifier<L>) -> Self {
        Self {
            shared: Arc::new(StoreSource {
                value_mutex: Mutex::new(initial),
                notifier,
            }),
        }
    }

    /// Returns a [`Source`] which provides read and subscribe access to this store.
    ///
    /// It can be coerced to [`sync::DynSource`] or [`unsync::DynSource`]
    /// when `T` and `L` meet the required bounds.
    #[must_use]
    pub fn as_source(&self) -> Arc<StoreSource<T, L>> {
        self.shared.clone()
    }

    /// Returns a clone of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> T {
        self.shared.snapshot_now()
    }

    /// Replaces the snapshot with `value` and notifies every subscribed listener once.
    ///
    /// This does not test whether the new value is equal to the old one; publishing an equal
    /// snapshot again notifies again. If that is not desired, call
    /// [`publish_if_changed()`](Self::publish_if_changed).
    pub fn publish(&self, value: T) {
        self.shared.publish_with(|| value);
    }

    /// Replaces the snapshot with the result of `compute` and notifies every subscribed
    /// listener once.
    ///
    /// `compute` runs while the snapshot is locked, so that reading some external state and
    /// storing the result is atomic with respect to other publishers: the stored snapshot
    /// always reflects the most recent reading.
    ///
    /// # Panics
    ///
    /// Reading this store from within `compute` may panic or deadlock.
    pub fn publish_with<F: FnOnce() -> T>(&self, compute: F) {
        self.shared.publish_with(compute);
    }

    /// Replaces the snapshot with `value` only if they are unequal,
    /// and notifies only in that case. Returns whether a change was published.
    ///
    /// Caution: This executes `PartialEq::eq()` with the lock held; this may delay readers of
    /// the value.
    ///
    /// # Example
    ///
    /// ```
    /// use tidings::{Flag, Source as _, unsync::Store};
    ///
    /// let store = Store::new(1);
    /// let flag = Flag::new(false);
    /// let _subscription = store.as_source().subscribe(flag.listener());
    ///
    /// assert!(store.publish_if_changed(2));
    /// assert_eq!(flag.get_and_clear(), true);
    /// assert!(!store.publish_if_changed(2));
    /// assert_eq!(flag.get_and_clear(), false);
    /// ```
    pub fn publish_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        let mut guard = self.shared.value_mutex.lock();
        if value == *guard {
            return false;
        }
        let _old_value = mem::replace(&mut *guard, value);

        // Don't hold the lock while notifying.
        drop(guard);

        self.shared.notifier.notify();
        true
    }

    /// Returns the number of listeners currently subscribed.
    ///
    /// This operation is intended for testing and diagnostic purposes.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.notifier.count()
    }

    /// Returns a weak handle which can publish into this store for as long as it exists.
    pub(crate) fn downgrade(&self) -> Weak<StoreSource<T, L>> {
        Arc::downgrade(&self.shared)
    }
}

impl<T, L> Drop for Store<T, L> {
    fn drop(&mut self) {
        self.shared.notifier.close();
    }
}

// -------------------------------------------------------------------------------------------------

impl<T: Clone, L: Listener + Clone> StoreSource<T, L> {
    fn snapshot_now(&self) -> T {
        T::clone(&*self.value_mutex.lock())
    }

    pub(crate) fn publish_with<F: FnOnce() -> T>(&self, compute: F) {
        // Using mem::replace instead of assignment so that _old_value will be dropped
        // after unlocking instead of before.
        let _old_value = {
            let mut guard = self.value_mutex.lock();
            mem::replace(&mut *guard, compute())
        };

        self.notifier.notify();
    }
}

impl<T, L> Source for StoreSource<T, L>
where
    T: Clone + fmt::Debug,
    L: Listener + Clone,
{
    type Value = T;
    type Listener = L;

    fn snapshot(&self) -> T {
        self.snapshot_now()
    }

    fn subscribe_raw(&self, listener: L) -> Subscription {
        self.notifier.subscribe_raw(listener)
    }
}

// -------------------------------------------------------------------------------------------------

impl<T: Clone + fmt::Debug, L: Listener + Clone> fmt::Debug for Store<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("Store");
        // Note that we do not simply lock the mutex and avoid cloning the value.
        // This is to ensure that we cannot deadlock or delay by holding the lock while
        // waiting for writes to the caller-provided output stream.
        ds.field("value", &self.snapshot());
        ds.field("owners", &Arc::strong_count(&self.shared));
        ds.field("listeners", &self.shared.notifier.count());
        ds.finish()
    }
}
impl<T: Clone + fmt::Debug, L: Listener + Clone> fmt::Debug for StoreSource<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            value_mutex: _, // used via snapshot_now()
            notifier,
        } = self;
        let mut ds = f.debug_struct("StoreSource");
        ds.field("value", &self.snapshot_now());
        // can't print owners because we don't have the Arc
        ds.field("listeners", &notifier.count());
        ds.finish()
    }
}

impl<T, L> fmt::Pointer for Store<T, L> {
    /// Prints the address of the store's shared state, which is the same address as its
    /// sources.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("Store");
        ds.field("address", &Arc::as_ptr(&self.shared));
        ds.finish()
    }
}

// -------------------------------------------------------------------------------------------------
