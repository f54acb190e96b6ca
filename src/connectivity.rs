//! Network connectivity as an external store.

#![allow(
    clippy::module_name_repetitions,
    reason = "types are re-exported at the crate root"
)]

use alloc::sync::{Arc, Weak};
use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::util::Unquote;
use crate::{
    IntoDynListener, Listener, ListenerError, Notifier, ParseEventError, Reporter, Store,
    StoreSource, Subscription,
};

#[cfg(doc)]
use crate::{sync, unsync, Source};

// -------------------------------------------------------------------------------------------------

/// Snapshot of whether the network is reachable.
#[expect(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Connectivity {
    /// Whether the host reports the network as reachable.
    pub online: bool,
}

impl Connectivity {
    /// Reads the current connectivity from `probe`.
    #[must_use]
    pub fn read<P: Probe + ?Sized>(probe: &P) -> Self {
        Self {
            online: probe.is_online(),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// The kinds of external signal that a [`ConnectivityAdapter`] listens for.
///
/// Their external names, as used by [`as_str()`](Self::as_str), [`fmt::Display`] and
/// [`FromStr`], are `"connectivity-gained"` and `"connectivity-lost"`.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConnectivityEvent {
    /// The host reports that the network became reachable.
    Gained,
    /// The host reports that the network became unreachable.
    Lost,
}

impl ConnectivityEvent {
    /// All event kinds.
    pub const ALL: [Self; 2] = [Self::Gained, Self::Lost];

    /// Returns the external name of this event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gained => "connectivity-gained",
            Self::Lost => "connectivity-lost",
        }
    }
}

impl fmt::Display for ConnectivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectivityEvent {
    type Err = ParseEventError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == name)
            .ok_or_else(|| ParseEventError::new(name))
    }
}

// -------------------------------------------------------------------------------------------------

/// Query of the host's current connectivity, consulted each time an event arrives.
///
/// The adapter deliberately does not trust event payloads; whatever the host says *now* is
/// what is published. Implementations must be quick and must not block.
pub trait Probe: fmt::Debug {
    /// Returns whether the network is currently reachable.
    fn is_online(&self) -> bool;
}

/// An `AtomicBool` is a probe whose answer is set by someone else; convenient when the
/// host's connectivity callback already tells you the new state.
impl Probe for AtomicBool {
    fn is_online(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<P: ?Sized + Probe> Probe for &P {
    fn is_online(&self) -> bool {
        (**self).is_online()
    }
}
impl<P: ?Sized + Probe> Probe for alloc::boxed::Box<P> {
    fn is_online(&self) -> bool {
        (**self).is_online()
    }
}
impl<P: ?Sized + Probe> Probe for Arc<P> {
    fn is_online(&self) -> bool {
        (**self).is_online()
    }
}

/// A [`Probe`] which calls a function. Construct this with [`probe_fn()`].
#[derive(Clone)]
pub struct ProbeFn<F>(F);

/// Returns a [`Probe`] which answers by calling `function`.
pub fn probe_fn<F: Fn() -> bool>(function: F) -> ProbeFn<F> {
    ProbeFn(function)
}

impl<F: Fn() -> bool> Probe for ProbeFn<F> {
    fn is_online(&self) -> bool {
        (self.0)()
    }
}

impl<F> fmt::Debug for ProbeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProbeFn")
            .field(&Unquote::type_name::<F>())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------

/// A host event system which can deliver [`ConnectivityEvent`]s to registered handlers.
///
/// Handlers are ordinary [`Listener`]s, registered per event kind, and removed by their
/// [`Subscription`].
pub trait EventSource {
    /// The type which all registered handlers must be convertible to.
    type Listener: Listener;

    /// Registers `handler` to be called each time `event` occurs.
    fn on<L: IntoDynListener<Self::Listener>>(
        &self,
        event: ConnectivityEvent,
        handler: L,
    ) -> Subscription
    where
        Self: Sized,
    {
        self.on_raw(event, handler.into_dyn_listener())
    }

    /// Registers a handler which is already of the stored type.
    fn on_raw(&self, event: ConnectivityEvent, handler: Self::Listener) -> Subscription;
}

impl<T: ?Sized + EventSource> EventSource for &T {
    type Listener = T::Listener;
    fn on_raw(&self, event: ConnectivityEvent, handler: Self::Listener) -> Subscription {
        (**self).on_raw(event, handler)
    }
}
impl<T: ?Sized + EventSource> EventSource for Arc<T> {
    type Listener = T::Listener;
    fn on_raw(&self, event: ConnectivityEvent, handler: Self::Listener) -> Subscription {
        (**self).on_raw(event, handler)
    }
}

/// In-memory [`EventSource`].
///
/// Hosts forward their platform's reachability callbacks into [`emit()`](Self::emit);
/// tests use it to simulate those callbacks.
///
/// We recommend that you use the type aliases [`sync::EventBus`] or [`unsync::EventBus`].
pub struct EventBus<L> {
    gained: Notifier<L>,
    lost: Notifier<L>,
}

impl<L> EventBus<L> {
    /// Constructs an [`EventBus`] with no handlers. Handler failures are reported with
    /// [`report_with_tracing()`](crate::report_with_tracing).
    #[must_use]
    pub fn new() -> Self {
        Self {
            gained: Notifier::new(),
            lost: Notifier::new(),
        }
    }

    /// Constructs an [`EventBus`] with no handlers, which passes handler failures
    /// to `reporter`.
    #[must_use]
    pub fn with_reporter(reporter: Reporter) -> Self {
        Self {
            gained: Notifier::with_reporter(reporter),
            lost: Notifier::with_reporter(reporter),
        }
    }

    fn notifier(&self, event: ConnectivityEvent) -> &Notifier<L> {
        match event {
            ConnectivityEvent::Gained => &self.gained,
            ConnectivityEvent::Lost => &self.lost,
        }
    }

    /// Returns the number of handlers currently registered for `event`.
    #[must_use]
    pub fn handler_count(&self, event: ConnectivityEvent) -> usize {
        self.notifier(event).count()
    }
}

impl<L: Listener + Clone> EventBus<L> {
    /// Calls every handler registered for `event`.
    pub fn emit(&self, event: ConnectivityEvent) {
        tracing::trace!(%event, "emitting connectivity event");
        self.notifier(event).notify();
    }
}

impl<L: Listener + Clone> EventSource for EventBus<L> {
    type Listener = L;

    fn on_raw(&self, event: ConnectivityEvent, handler: L) -> Subscription {
        self.notifier(event).subscribe_raw(handler)
    }
}

impl<L> Default for EventBus<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> fmt::Debug for EventBus<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("gained", &self.gained)
            .field("lost", &self.lost)
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------

/// Change-source adapter which keeps a [`Store`] of [`Connectivity`] up to date from an
/// [`EventSource`].
///
/// On creation, it reads the initial snapshot from its [`Probe`] and registers one handler
/// per [`ConnectivityEvent`] kind. Each event causes exactly one publish of a snapshot
/// recomputed from the probe. Duplicate events produce duplicate publishes; consumers which
/// care can compare snapshots.
///
/// [`dispose()`](Self::dispose), or dropping the adapter, removes the handlers from the event
/// source. The handlers hold only weak references to the store, so the event source never
/// keeps the store alive in any case.
///
/// We recommend that you use the type aliases [`sync::ConnectivityAdapter`] or
/// [`unsync::ConnectivityAdapter`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use tidings::{Bridge, Connectivity, ConnectivityEvent};
/// use tidings::unsync::{ConnectivityAdapter, EventBus};
///
/// let reachable = Arc::new(AtomicBool::new(true));
/// let events = EventBus::new();
/// let adapter = ConnectivityAdapter::create(&events, reachable.clone());
///
/// let bridge = Bridge::activate(adapter.source());
/// assert_eq!(bridge.snapshot(), Connectivity { online: true });
///
/// reachable.store(false, Ordering::Release);
/// events.emit(ConnectivityEvent::Lost);
/// assert_eq!(bridge.take_changed(), Some(Connectivity { online: false }));
/// ```
pub struct ConnectivityAdapter<L> {
    store: Store<Connectivity, L>,
    registrations: Option<[Subscription; 2]>,
}

impl<L: Listener + Clone> ConnectivityAdapter<L> {
    /// Creates a store reflecting `probe`, and registers handlers with `events` which keep
    /// it up to date.
    pub fn create<E, P>(events: &E, probe: P) -> Self
    where
        E: EventSource,
        P: Probe + 'static,
        ConnectivityHandler<P, L>: IntoDynListener<E::Listener>,
    {
        Self::create_with_store(events, probe, Store::new)
    }

    /// Like [`create()`](Self::create), but the store passes listener failures to `reporter`.
    pub fn create_with_reporter<E, P>(events: &E, probe: P, reporter: Reporter) -> Self
    where
        E: EventSource,
        P: Probe + 'static,
        ConnectivityHandler<P, L>: IntoDynListener<E::Listener>,
    {
        Self::create_with_store(events, probe, |initial| {
            Store::with_reporter(initial, reporter)
        })
    }

    fn create_with_store<E, P>(
        events: &E,
        probe: P,
        new_store: impl FnOnce(Connectivity) -> Store<Connectivity, L>,
    ) -> Self
    where
        E: EventSource,
        P: Probe + 'static,
        ConnectivityHandler<P, L>: IntoDynListener<E::Listener>,
    {
        let probe = Arc::new(probe);
        let store = new_store(Connectivity::read(&*probe));
        let registrations = ConnectivityEvent::ALL.map(|event| {
            events.on(
                event,
                ConnectivityHandler {
                    store: store.downgrade(),
                    probe: probe.clone(),
                    event,
                },
            )
        });
        tracing::debug!(
            online = store.snapshot().online,
            "connectivity adapter created"
        );
        Self {
            store,
            registrations: Some(registrations),
        }
    }

    /// Returns the [`Source`] through which consumers read and subscribe to connectivity.
    #[must_use]
    pub fn source(&self) -> Arc<StoreSource<Connectivity, L>> {
        self.store.as_source()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Connectivity {
        self.store.snapshot()
    }
}

impl<L> ConnectivityAdapter<L> {
    /// Returns whether [`dispose()`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.registrations.is_none()
    }

    /// Removes this adapter's handlers from the event source.
    ///
    /// After this, the store's snapshot no longer changes, but remains readable through
    /// existing sources. Calling this more than once has no further effect.
    pub fn dispose(&mut self) {
        if let Some(registrations) = self.registrations.take() {
            for registration in &registrations {
                registration.unsubscribe();
            }
            tracing::debug!("connectivity adapter disposed");
        }
    }
}

impl<L> Drop for ConnectivityAdapter<L> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<L: Listener + Clone> fmt::Debug for ConnectivityAdapter<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivityAdapter")
            .field("snapshot", &self.snapshot())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------

/// The handler a [`ConnectivityAdapter`] registers with its [`EventSource`].
///
/// You should not usually need to use this type explicitly; it appears in the bounds of
/// [`ConnectivityAdapter::create()`].
pub struct ConnectivityHandler<P, L> {
    store: Weak<StoreSource<Connectivity, L>>,
    probe: Arc<P>,
    event: ConnectivityEvent,
}

impl<P: Probe, L: Listener + Clone> Listener for ConnectivityHandler<P, L> {
    fn changed(&self) -> Result<(), ListenerError> {
        // A missing store means it was dropped while still registered; nothing to update.
        let Some(store) = self.store.upgrade() else {
            return Ok(());
        };
        store.publish_with(|| {
            let snapshot = Connectivity::read(&*self.probe);
            tracing::trace!(
                event = %self.event,
                online = snapshot.online,
                "republishing connectivity"
            );
            snapshot
        });
        Ok(())
    }
}

impl<P: fmt::Debug, L> fmt::Debug for ConnectivityHandler<P, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivityHandler")
            .field("event", &self.event)
            .field("probe", &self.probe)
            .field("alive", &(self.store.strong_count() > 0))
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
