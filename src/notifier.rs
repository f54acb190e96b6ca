use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::mem;
use core::sync::atomic::AtomicBool;

use arrayvec::ArrayVec;

use crate::maybe_sync::RwLock;
use crate::{report_with_tracing, IntoDynListener, Listener, ListenerError, ListenerFailure};
use crate::{Reporter, Subscription};

#[cfg(doc)]
use crate::Store;

// -------------------------------------------------------------------------------------------------

/// Number of listeners a notification round can copy without allocating.
const INLINE_ROUND: usize = 8;

#[cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
/// Listener registry.
///
/// A `Notifier<L>` delivers change notifications to a dynamic set of [`Listener`]s
/// of type `L`. `L` is usually a trait object type such as `Arc<dyn Listener + Send + Sync>`,
/// and must be cheap to [`Clone`], because each notification round works on a copy of the
/// registered listeners. That is what allows listeners to subscribe and unsubscribe while
/// being notified, without deadlock and without disturbing the round in progress.
///
/// The `Notifier` is usually owned by some entity which changes, such as a [`Store`].
///
/// We recommend that you use the type aliases [`sync::Notifier`](crate::sync::Notifier)
/// or [`unsync::Notifier`](crate::unsync::Notifier), to avoid writing the type parameter
/// `L` outside of special cases.
pub struct Notifier<L> {
    state: RwLock<NotifierState<L>>,
    reporter: Reporter,
}

struct NotifierState<L> {
    entries: Vec<NotifierEntry<L>>,
    /// Set by [`Notifier::close()`]; no entries may be added afterward.
    closed: bool,
}

struct NotifierEntry<L> {
    listener: L,
    /// Shared with the [`Subscription`]; false once unsubscribed.
    active: Arc<AtomicBool>,
}

impl<L> Notifier<L> {
    /// Constructs a new [`Notifier`] with no listeners, which reports listener failures
    /// using [`report_with_tracing()`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_reporter(report_with_tracing)
    }

    /// Constructs a new [`Notifier`] with no listeners, which reports listener failures
    /// to the given function.
    #[must_use]
    pub fn with_reporter(reporter: Reporter) -> Self {
        Self {
            state: RwLock::new(NotifierState {
                entries: Vec::new(),
                closed: false,
            }),
            reporter,
        }
    }

    /// Drops all listeners and refuses new ones.
    ///
    /// Use this when the owner knows that no further change will ever happen, so that
    /// listeners (and whatever they keep alive) are released. All outstanding
    /// [`Subscription`]s become inactive.
    pub fn close(&self) {
        let entries = {
            let mut state = self.state.write();
            state.closed = true;
            mem::take(&mut state.entries)
        };
        for entry in &entries {
            Subscription::deactivate_entry(&entry.active);
        }
        if !entries.is_empty() {
            tracing::trace!(listeners = entries.len(), "notifier closed");
        }
        // Listeners are dropped here, after the lock is released.
        drop(entries);
    }

    /// Returns whether [`close()`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Computes the exact count of listeners which are still subscribed,
    /// discarding the entries of any which have been unsubscribed.
    ///
    /// This operation is intended for testing and diagnostic purposes.
    #[must_use]
    pub fn count(&self) -> usize {
        let mut state = self.state.write();
        Self::cleanup(&mut state.entries);
        state.entries.len()
    }

    /// Discard all entries whose subscriptions have been cancelled.
    #[mutants::skip] // equivalent to leaking, which tests can only observe indirectly
    fn cleanup(entries: &mut Vec<NotifierEntry<L>>) {
        entries.retain(|entry| Subscription::is_entry_active(&entry.active));
    }
}

impl<L: Listener + Clone> Notifier<L> {
    /// Registers `listener` to be notified of every future change, until the returned
    /// [`Subscription`] is unsubscribed or dropped.
    ///
    /// If the notifier has been [closed](Self::close), the listener is dropped immediately
    /// and the returned subscription is already inactive.
    pub fn subscribe<L2: IntoDynListener<L>>(&self, listener: L2) -> Subscription {
        self.subscribe_raw(listener.into_dyn_listener())
    }

    /// Registers a listener which is already of the stored type `L`.
    ///
    /// Compared to [`subscribe()`](Self::subscribe), this can be used when
    /// [`IntoDynListener`] is not implemented.
    pub fn subscribe_raw(&self, listener: L) -> Subscription {
        let mut state = self.state.write();
        if state.closed {
            drop(state);
            drop(listener);
            return Subscription::inert();
        }
        // TODO: consider amortization by not doing cleanup every time
        Self::cleanup(&mut state.entries);
        let (subscription, active) = Subscription::new();
        state.entries.push(NotifierEntry { listener, active });
        subscription
    }

    /// Tells every currently subscribed [`Listener`] that a change happened.
    ///
    /// Every listener which was subscribed when this call started, and which has not been
    /// unsubscribed by the time its turn comes, is called exactly once before this returns.
    /// Listeners subscribed during the round are first called in the next round.
    ///
    /// A listener which fails does not prevent the others from being called;
    /// its failure is passed to this notifier's [`Reporter`].
    pub fn notify(&self) {
        let round = {
            let mut state = self.state.write();
            Self::cleanup(&mut state.entries);
            Round::copy_of(&state.entries)
        };

        for (listener, active) in round.as_slice() {
            if !Subscription::is_entry_active(active) {
                continue;
            }
            if let Err(error) = deliver(listener) {
                (self.reporter)(&ListenerFailure::new(listener, &error));
            }
        }
    }
}

impl<L> Default for Notifier<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> fmt::Debug for Notifier<L> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        // not using fmt.debug_tuple() so this is never printed on multiple lines
        if let Some(state) = self.state.try_read() {
            let live = state
                .entries
                .iter()
                .filter(|entry| Subscription::is_entry_active(&entry.active))
                .count();
            write!(fmt, "Notifier({live})")
        } else {
            write!(fmt, "Notifier(?)")
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// The listeners of one notification round, copied out of the registry so that the
/// registry lock is not held while they run.
enum Round<L> {
    Inline(ArrayVec<(L, Arc<AtomicBool>), INLINE_ROUND>),
    Heap(Vec<(L, Arc<AtomicBool>)>),
}

impl<L: Clone> Round<L> {
    fn copy_of(entries: &[NotifierEntry<L>]) -> Self {
        let copies = entries
            .iter()
            .map(|entry| (entry.listener.clone(), entry.active.clone()));
        if entries.len() <= INLINE_ROUND {
            Round::Inline(copies.collect())
        } else {
            Round::Heap(copies.collect())
        }
    }

    fn as_slice(&self) -> &[(L, Arc<AtomicBool>)] {
        match self {
            Round::Inline(copies) => copies.as_slice(),
            Round::Heap(copies) => copies.as_slice(),
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(feature = "std")]
fn deliver<L: Listener>(listener: &L) -> Result<(), ListenerError> {
    std::panic::catch_unwind(core::panic::AssertUnwindSafe(|| listener.changed())).unwrap_or_else(
        |payload| {
            Err(ListenerError::Panicked {
                message: panic_message(&*payload),
            })
        },
    )
}

#[cfg(not(feature = "std"))]
fn deliver<L: Listener>(listener: &L) -> Result<(), ListenerError> {
    listener.changed()
}

#[cfg(feature = "std")]
fn panic_message(payload: &(dyn core::any::Any + Send)) -> alloc::string::String {
    use alloc::string::{String, ToString as _};

    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("<non-string panic payload>")
    }
}

// -------------------------------------------------------------------------------------------------
