use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(doc)]
use crate::{Listener, Notifier, Source};

/// The capability to remove one listener registration, returned by
/// [`Source::subscribe()`] and [`Notifier::subscribe()`].
///
/// Calling [`unsubscribe()`](Self::unsubscribe) (or dropping the `Subscription`) stops
/// the [`Listener`] from receiving any further notifications. It takes effect immediately for
/// notification rounds which have not yet reached that listener, and for all later rounds.
/// Unsubscribing more than once is harmless.
///
/// A `Subscription` does not keep its source alive, and is [`Send`] and [`Sync`] regardless
/// of the listener type.
///
/// Subscribing the same listener twice produces two independent registrations, each with its
/// own `Subscription`. This is usually a mistake, but it is not prevented.
#[must_use = "dropping a Subscription unsubscribes its listener; call .detach() to keep it"]
pub struct Subscription {
    /// Shared with the registry entry; cleared to remove the listener.
    /// [`None`] if detached.
    active: Option<Arc<AtomicBool>>,
}

impl Subscription {
    const CLEAR_ORDERING: Ordering = Ordering::Release;
    const LOAD_ORDERING: Ordering = Ordering::Acquire;

    /// Creates a new subscription and the flag the registry entry will check.
    pub(crate) fn new() -> (Self, Arc<AtomicBool>) {
        let active = Arc::new(AtomicBool::new(true));
        (
            Self {
                active: Some(active.clone()),
            },
            active,
        )
    }

    /// Returns a `Subscription` which was never registered with anything.
    ///
    /// This is what sources which never change, and closed notifiers, hand out.
    pub fn inert() -> Self {
        Self {
            active: Some(Arc::new(AtomicBool::new(false))),
        }
    }

    /// Removes the listener registration this token was returned for.
    ///
    /// Calling this more than once has no further effect.
    pub fn unsubscribe(&self) {
        if let Some(active) = &self.active {
            active.store(false, Self::CLEAR_ORDERING);
        }
    }

    /// Returns whether the listener is still registered.
    ///
    /// This becomes false after [`unsubscribe()`](Self::unsubscribe) or when the source is
    /// closed (for example, when its [`Store`](crate::Store) is dropped).
    /// For a detached subscription, returns false since nothing can be known.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.load(Self::LOAD_ORDERING))
    }

    /// Gives up the ability to unsubscribe, leaving the listener registered for as long
    /// as its source exists.
    pub fn detach(mut self) {
        self.active = None;
    }

    pub(crate) fn is_entry_active(flag: &AtomicBool) -> bool {
        flag.load(Self::LOAD_ORDERING)
    }

    pub(crate) fn deactivate_entry(flag: &AtomicBool) {
        flag.store(false, Self::CLEAR_ORDERING);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never multiline
        match &self.active {
            Some(_) => write!(f, "Subscription({})", self.is_active()),
            None => write!(f, "Subscription(detached)"),
        }
    }
}

// -------------------------------------------------------------------------------------------------
