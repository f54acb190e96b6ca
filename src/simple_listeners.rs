use alloc::sync::{Arc, Weak};
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::util::Unquote;
use crate::{Listener, ListenerError};

// -------------------------------------------------------------------------------------------------

/// A [`Listener`] which discards all notifications.
///
/// Use this when a [`Listener`] is demanded, but there is nothing it should do.
#[expect(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NullListener;

impl Listener for NullListener {
    fn changed(&self) -> Result<(), ListenerError> {
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`Listener`] which calls a function each time it is notified.
///
/// Construct this with [`listener_fn()`].
/// The function should be quick and must follow the rules in [`Listener::changed()`].
#[derive(Clone)]
pub struct FnListener<F>(F);

/// Returns a [`Listener`] which calls `function` each time it is notified.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use tidings::{listener_fn, Source as _, unsync::Store};
///
/// let store = Store::new("idle");
/// let calls = Rc::new(Cell::new(0));
/// let _subscription = store.as_source().subscribe(listener_fn({
///     let calls = calls.clone();
///     move || calls.set(calls.get() + 1)
/// }));
///
/// store.publish("busy");
/// assert_eq!(calls.get(), 1);
/// ```
pub fn listener_fn<F: Fn()>(function: F) -> FnListener<F> {
    FnListener(function)
}

impl<F: Fn()> Listener for FnListener<F> {
    fn changed(&self) -> Result<(), ListenerError> {
        (self.0)();
        Ok(())
    }
}

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnListener")
            .field(&Unquote::type_name::<F>())
            .finish()
    }
}

/// A [`Listener`] which calls a fallible function each time it is notified.
///
/// Construct this with [`try_listener_fn()`].
#[derive(Clone)]
pub struct TryFnListener<F>(F);

/// Returns a [`Listener`] which calls `function` each time it is notified, and reports
/// any error it returns.
pub fn try_listener_fn<F>(function: F) -> TryFnListener<F>
where
    F: Fn() -> Result<(), ListenerError>,
{
    TryFnListener(function)
}

impl<F> Listener for TryFnListener<F>
where
    F: Fn() -> Result<(), ListenerError>,
{
    fn changed(&self) -> Result<(), ListenerError> {
        (self.0)()
    }
}

impl<F> fmt::Debug for TryFnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TryFnListener")
            .field(&Unquote::type_name::<F>())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg_attr(not(feature = "async"), allow(rustdoc::broken_intra_doc_links))]
/// A [`Listener`] destination which records only whether any notification has been received,
/// until cleared.
///
/// It is implemented as a shared [`AtomicBool`], and is [`Send`] and [`Sync`] regardless of
/// whether the `"sync"` crate feature is enabled.
///
/// The atomic orderings used are [`Release`](Ordering::Release) for setting the flag, and
/// [`Acquire`](Ordering::Acquire) for reading and clearing it,
/// so a reader which sees the flag set also sees the snapshot that caused it.
///
/// # See also
///
/// * [`Bridge`](crate::Bridge) pairs a `Flag` with a source and its subscription.
/// * [`future::WakeFlag`](crate::future::WakeFlag) is similar but wakes an async task
///   instead of needing to be polled.
pub struct Flag {
    shared: Arc<AtomicBool>,
}

/// [`Flag::listener()`] implementation.
#[derive(Clone)]
pub struct FlagListener {
    weak: Weak<AtomicBool>,
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never multiline
        write!(f, "Flag({:?})", self.shared.load(Ordering::Relaxed))
    }
}
impl fmt::Debug for FlagListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strong = self.weak.upgrade();

        let mut ds = f.debug_struct("FlagListener");
        ds.field("alive", &strong.is_some());
        if let Some(strong) = strong {
            ds.field("value", &(strong.load(Ordering::Relaxed)));
        }
        ds.finish()
    }
}

impl Flag {
    const SET_ORDERING: Ordering = Ordering::Release;
    const GET_CLEAR_ORDERING: Ordering = Ordering::Acquire;

    /// Constructs a new [`Flag`] with the given initial value.
    ///
    /// ```
    /// # use tidings::Flag;
    /// assert_eq!(Flag::new(false).get_and_clear(), false);
    /// assert_eq!(Flag::new(true).get_and_clear(), true);
    /// ```
    #[must_use]
    pub fn new(value: bool) -> Self {
        Self {
            shared: Arc::new(AtomicBool::new(value)),
        }
    }

    /// Returns a [`Listener`] which will set this flag to [`true`] when it is notified.
    #[must_use]
    pub fn listener(&self) -> FlagListener {
        FlagListener {
            weak: Arc::downgrade(&self.shared),
        }
    }

    /// Returns the flag value, setting it to [`false`] at the same time.
    #[allow(clippy::must_use_candidate)]
    #[inline]
    pub fn get_and_clear(&self) -> bool {
        self.shared.swap(false, Self::GET_CLEAR_ORDERING)
    }

    /// Set the flag value to [`true`].
    ///
    /// It may be useful in situations where the caller of `get_and_clear()` realizes it cannot
    /// actually complete its work, but wants to try again later.
    #[inline]
    pub fn set(&self) {
        self.shared.store(true, Self::SET_ORDERING);
    }
}

impl Listener for FlagListener {
    fn changed(&self) -> Result<(), ListenerError> {
        // If the Flag is gone, there is nobody left to tell; that is not a failure.
        if let Some(cell) = self.weak.upgrade() {
            cell.store(true, Flag::SET_ORDERING);
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`Listener`] destination which counts the notifications it receives.
///
/// This is mostly useful for tests and diagnostics; to find out whether anything changed,
/// [`Flag`] is sufficient.
pub struct Counter {
    shared: Arc<AtomicUsize>,
}

/// [`Counter::listener()`] implementation.
#[derive(Clone)]
pub struct CounterListener {
    weak: Weak<AtomicUsize>,
}

impl Counter {
    /// Constructs a new [`Counter`] at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a [`Listener`] which will increment this counter each time it is notified.
    #[must_use]
    pub fn listener(&self) -> CounterListener {
        CounterListener {
            weak: Arc::downgrade(&self.shared),
        }
    }

    /// Returns the number of notifications received since the last `take()`,
    /// and resets it to zero.
    ///
    /// ```
    /// use tidings::{Counter, Listener as _};
    ///
    /// let counter = Counter::new();
    /// counter.listener().changed().unwrap();
    /// counter.listener().changed().unwrap();
    /// assert_eq!(counter.take(), 2);
    /// assert_eq!(counter.take(), 0);
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn take(&self) -> usize {
        self.shared.swap(0, Ordering::Acquire)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Counter({})", self.shared.load(Ordering::Relaxed))
    }
}
impl fmt::Debug for CounterListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterListener")
            .field("alive", &(self.weak.strong_count() > 0))
            .finish()
    }
}

impl Listener for CounterListener {
    fn changed(&self) -> Result<(), ListenerError> {
        if let Some(count) = self.weak.upgrade() {
            count.fetch_add(1, Ordering::Release);
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
