//! Read-and-subscribe access to values which may change.

use core::fmt;
use core::marker::PhantomData;

use alloc::sync::Arc;

use crate::{IntoDynListener, Listener, Subscription};

// -------------------------------------------------------------------------------------------------

/// Access to a snapshot that might be replaced, and notifications when it is.
///
/// This is the surface a consumer sees: [`snapshot()`](Self::snapshot) to read the current
/// value, and [`subscribe()`](Self::subscribe) to be told when there is a new one.
///
/// `Source`s should usually, but are not required to, implement [`Clone`] such that all clones
/// have identical future behavior (values returned and notifications sent). They should
/// implement [`fmt::Debug`] in a way which identifies the source rather than only its current
/// value.
///
/// The change notifications given do not carry the new value.
/// This allows sources to deliver notifications *after* the value has changed (i.e. while not
/// holding any lock) without also needing a clone of, or reference-counted pointer to, the value.
///
/// The type aliases [`sync::DynSource`](crate::sync::DynSource)
/// and [`unsync::DynSource`](crate::unsync::DynSource) are available for type-erased `Source`s
/// with type-erased `Listener`s.
pub trait Source: fmt::Debug {
    /// The type of snapshot which can be obtained from this source.
    type Value;

    /// The type which all subscribed listeners must be convertible to.
    type Listener: Listener;

    /// Returns the current snapshot.
    ///
    /// This never blocks on anything but a short internal lock and has no side effects,
    /// so it may be called any number of times, for example once per speculative render pass.
    /// Two calls with no change published in between return equal values.
    #[must_use]
    fn snapshot(&self) -> Self::Value;

    /// Subscribes the given [`Listener`] to changes of this source.
    ///
    /// The listener is notified once per change until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    ///
    /// By default, this method is equivalent to
    ///
    /// ```ignore
    /// self.subscribe_raw(listener.into_dyn_listener())
    /// ```
    fn subscribe<L: IntoDynListener<Self::Listener>>(&self, listener: L) -> Subscription
    where
        Self: Sized,
    {
        self.subscribe_raw(listener.into_dyn_listener())
    }

    /// Subscribes the given [`Listener`] to changes of this source.
    ///
    /// Compared to `subscribe()`, `subscribe_raw()` requires that the given listener be of
    /// exactly the type that it will be stored as. In exchange, it can be used with
    /// `dyn Source`. It is also the method which implementors of `Source` must implement.
    fn subscribe_raw(&self, listener: Self::Listener) -> Subscription;
}

impl<T: ?Sized + Source> Source for &T {
    type Value = T::Value;
    type Listener = T::Listener;
    fn snapshot(&self) -> Self::Value {
        T::snapshot(*self)
    }
    fn subscribe_raw(&self, listener: Self::Listener) -> Subscription {
        T::subscribe_raw(*self, listener)
    }
}
impl<T: ?Sized + Source> Source for alloc::boxed::Box<T> {
    type Value = T::Value;
    type Listener = T::Listener;
    fn snapshot(&self) -> Self::Value {
        T::snapshot(&**self)
    }
    fn subscribe_raw(&self, listener: Self::Listener) -> Subscription {
        T::subscribe_raw(&**self, listener)
    }
}
impl<T: ?Sized + Source> Source for alloc::rc::Rc<T> {
    type Value = T::Value;
    type Listener = T::Listener;
    fn snapshot(&self) -> Self::Value {
        T::snapshot(&**self)
    }
    fn subscribe_raw(&self, listener: Self::Listener) -> Subscription {
        T::subscribe_raw(&**self, listener)
    }
}
impl<T: ?Sized + Source> Source for Arc<T> {
    type Value = T::Value;
    type Listener = T::Listener;
    fn snapshot(&self) -> Self::Value {
        T::snapshot(&**self)
    }
    fn subscribe_raw(&self, listener: Self::Listener) -> Subscription {
        T::subscribe_raw(&**self, listener)
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`Source`] of a constant value; never sends a change notification.
///
/// Subscribing to it drops the listener immediately and returns an inactive
/// [`Subscription`]. This is useful where a consumer expects a [`Source`] but the state is
/// known never to change, such as on a platform without any connectivity signal.
///
/// # Generic parameters
///
/// * `T` is the type of the value.
/// * `L` is the type of [`Listener`] this source accepts but never uses.
///
/// # Example
///
/// ```
/// use tidings::{Bridge, Connectivity, unsync::Constant};
///
/// let always_online: Constant<Connectivity> = Constant::new(Connectivity { online: true });
/// let bridge = Bridge::activate(always_online);
///
/// assert_eq!(bridge.snapshot(), Connectivity { online: true });
/// assert_eq!(bridge.take_changed(), None);
/// ```
pub struct Constant<T, L> {
    value: T,
    _phantom: PhantomData<fn(L)>,
}

impl<T, L> Constant<T, L> {
    /// Constructs a [`Constant`] whose [`snapshot()`](Source::snapshot) always returns a
    /// clone of `value`.
    pub const fn new(value: T) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    /// Destroys this [`Constant`] and returns the value it contained.
    pub fn into_inner(self) -> T {
        self.value
    }
}

// Design note: If it were possible, we would not have this `Debug` bound.
// It is necessary because `Source` requires `Debug`, and our own `Debug`
// implementation prints the value (it would be useless otherwise).
impl<T: Clone + fmt::Debug, L: Listener> Source for Constant<T, L> {
    type Value = T;
    type Listener = L;

    fn snapshot(&self) -> Self::Value {
        self.value.clone()
    }

    fn subscribe<L2: IntoDynListener<L>>(&self, _: L2) -> Subscription {
        // skipping the boxing that would happen if we only implemented subscribe_raw()
        Subscription::inert()
    }

    fn subscribe_raw(&self, _: Self::Listener) -> Subscription {
        Subscription::inert()
    }
}

impl<T: fmt::Debug, L> fmt::Debug for Constant<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constant").field(&self.value).finish()
    }
}

impl<T: Copy, L> Copy for Constant<T, L> {}
impl<T: Clone, L> Clone for Constant<T, L> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Eq, L> Eq for Constant<T, L> {}
impl<T: PartialEq, L> PartialEq for Constant<T, L> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Default, L> Default for Constant<T, L> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, L> AsRef<T> for Constant<T, L> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T, L> From<T> for Constant<T, L> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

// Convenience conversions directly to coerced trait object,
// instead of `Arc::new()` followed by coercion.
impl<T> From<Constant<T, crate::unsync::DynListener>> for crate::unsync::DynSource<T>
where
    T: Clone + fmt::Debug + 'static,
{
    fn from(value: Constant<T, crate::unsync::DynListener>) -> Self {
        Arc::new(value)
    }
}
impl<T> From<Constant<T, crate::sync::DynListener>> for crate::sync::DynSource<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn from(value: Constant<T, crate::sync::DynListener>) -> Self {
        Arc::new(value)
    }
}
