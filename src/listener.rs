use core::fmt;

use crate::{sync, unsync, ListenerError};

#[cfg(doc)]
use crate::{Flag, Source};
#[cfg(doc)]
use alloc::{rc::Rc, sync::Arc};

#[cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
/// A receiver of change notifications (typically from a [`Source`]).
///
/// A listener is told *that* something changed, never *what* it changed to;
/// it is expected to re-read the value from its source when it is ready to.
///
/// Listeners are typically used in trait object form, which may be created via the
/// [`IntoDynListener`] trait in addition to the usual coercions;
/// this is done automatically by [`Source::subscribe()`].
///
/// Please note the requirements set out in [`Listener::changed()`].
///
/// Consider using [`Flag`] rather than implementing [`Listener`] yourself;
/// it is the cheapest way to find out later that something changed.
pub trait Listener: fmt::Debug {
    /// Record that the state this listener is subscribed to has changed.
    ///
    /// Returning an error does not unsubscribe the listener and does not affect delivery
    /// to other listeners; the error is passed to the notifier's
    /// [`Reporter`](crate::Reporter).
    ///
    /// # Requirements on implementors
    ///
    /// * Do not rely on being called before or after any other listener;
    ///   the order of delivery is unspecified.
    ///
    /// * Avoid panicking. With the `"std"` feature, a panic is caught and reported as
    ///   [`ListenerError::Panicked`]; without it, a panic unwinds through the publisher
    ///   and the rest of the notification round is lost.
    ///
    /// * Do not acquire any locks except ones which are used only for the state of the
    ///   listener itself, and do not perform any other blocking operation.
    ///
    /// * Do not access thread-local state, since this may be called from whichever thread(s)
    ///   the publisher is using.
    ///
    /// # Advice for implementors
    ///
    /// The notifying lock is not held while listeners run, so a listener may read the
    /// new snapshot, subscribe, or unsubscribe without deadlock. Even so, the typical
    /// listener should only set a flag or wake a task, and leave the actual work to
    /// whoever reads that flag.
    fn changed(&self) -> Result<(), ListenerError>;

    /// Convert this listener into trait object form, allowing it to be stored in
    /// collections or passed non-generically.
    /// The produced trait object does not implement [`Sync`].
    ///
    /// The purpose of this method over simply calling [`Rc::new()`](alloc::rc::Rc::new)
    /// is that it will avoid double-wrapping of a listener that's already in [`Rc`].
    ///
    /// **You should not need to override or call this method;** use [`IntoDynListener`] instead.
    #[doc(hidden)]
    fn into_dyn_listener_unsync(self) -> unsync::DynListener
    where
        Self: Sized + 'static,
    {
        alloc::rc::Rc::new(self)
    }

    /// Convert this listener into trait object form, allowing it to be stored in
    /// collections or passed non-generically.
    /// The produced trait object implements [`Sync`].
    ///
    /// The purpose of this method over simply calling [`Arc::new()`](alloc::sync::Arc::new)
    /// is that it will avoid double-wrapping of a listener that's already in [`Arc`].
    ///
    /// **You should not need to override or call this method;** use [`IntoDynListener`] instead.
    #[doc(hidden)]
    fn into_dyn_listener_sync(self) -> sync::DynListener
    where
        Self: Sized + Send + Sync + 'static,
    {
        alloc::sync::Arc::new(self)
    }
}

// -------------------------------------------------------------------------------------------------
// Type-erasure related traits and impls.

/// Conversion from a concrete listener type to (normally) some flavor of boxed trait object.
///
/// This trait is a helper for [`Source::subscribe()`] and generally does not need to be
/// implemented, unless you are using a custom type for your type-erased listeners that is
/// neither [`sync::DynListener`] nor [`unsync::DynListener`].
///
/// # Generic parameters
///
/// * `Self` is the listener type being converted from.
/// * `L` is the listener type being converted to.
pub trait IntoDynListener<L: Listener>: Listener {
    /// Wrap this [`Listener`] into a type-erased form of type `L`.
    fn into_dyn_listener(self) -> L;
}

impl<L> IntoDynListener<sync::DynListener> for L
where
    L: Listener + Send + Sync + 'static,
{
    fn into_dyn_listener(self) -> sync::DynListener {
        self.into_dyn_listener_sync()
    }
}

impl<L> IntoDynListener<unsync::DynListener> for L
where
    L: Listener + 'static,
{
    fn into_dyn_listener(self) -> unsync::DynListener {
        self.into_dyn_listener_unsync()
    }
}

impl Listener for unsync::DynListener {
    fn changed(&self) -> Result<(), ListenerError> {
        (**self).changed()
    }

    fn into_dyn_listener_unsync(self) -> unsync::DynListener {
        self
    }

    // into_dyn_listener_sync() is unimplementable because its bounds are not met.
}

impl Listener for sync::DynListener {
    fn changed(&self) -> Result<(), ListenerError> {
        (**self).changed()
    }

    // into_dyn_listener_unsync() will result in double-wrapping.
    // That could be avoided by using `Arc` even for `unsync::DynListener`,
    // but mixing flavors should be rare.

    fn into_dyn_listener_sync(self) -> sync::DynListener {
        self
    }
}
