//! Integration with `async` programming.
//!
//! This module is only available if the Cargo feature `"async"` is enabled.

use alloc::sync::{Arc, Weak};
use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll};
use futures_core::Stream;

use futures_util::task::AtomicWaker;

use crate::{IntoDynListener, Listener, ListenerError, Source, Subscription};

// -------------------------------------------------------------------------------------------------

/// A [`Listener`] destination which can wake an async task.
///
/// This is similar to an async MPSC channel except that it carries no data, only wakeups.
/// Like a channel, it has a sending side [`WakeFlagListener`] and a receiving side
/// [`WakeFlag`], and the receiving side notices when every sender has been dropped.
///
/// Its intended use is to allow a looping task to sleep until it needs to take an action.
///
/// `WakeFlag` uses only atomic operations and no locks, and therefore may be used on `no_std`
/// platforms.
///
/// # Example
///
/// In this async code sample, a task waits for connectivity changes and records each new
/// snapshot:
///
/// ```
/// # futures::executor::block_on(async {
/// use tidings::{Connectivity, future::WakeFlag, Source as _, unsync::Store};
///
/// let store: Store<Connectivity> = Store::new(Connectivity { online: false });
/// let source = store.as_source();
/// let mut flag = WakeFlag::listening(false, &source);
///
/// store.publish(Connectivity { online: true });
/// assert!(flag.wait().await);
/// assert_eq!(source.snapshot(), Connectivity { online: true });
///
/// // Dropping the store drops its listeners, so there is nothing more to wait for.
/// drop(store);
/// assert!(!flag.wait().await);
/// # })
/// ```
#[derive(Debug)]
pub struct WakeFlag {
    /// Shared state between the [`WakeFlag`] and [`WakeFlagListener`]s.
    shared: Arc<WakeFlagShared>,

    /// Present if this flag was created by [`WakeFlag::listening()`].
    subscription: Option<Subscription>,
}

/// [`WakeFlag`]’s accompanying listener implementation.
#[derive(Clone, Debug)]
pub struct WakeFlagListener {
    shared: Weak<WakeFlagShared>,

    /// This value existing signals to the [`WakeFlag`] that at least one listener exists.
    _alive: Arc<()>,
}

#[derive(Debug)]
struct WakeFlagFuture<'a> {
    shared: &'a WakeFlagShared,
    done: bool,
}

#[derive(Debug)]
struct WakeFlagShared {
    notified: AtomicBool,

    /// This weak reference breaks when no [`WakeFlagListener`]s exist
    /// and thus the flag can never wake again.
    listeners_alive: Weak<()>,

    /// Woken when a change arrives or a listener is dropped.
    waker: AtomicWaker,
}

impl WakeFlag {
    const SET_ORDERING: Ordering = Ordering::Release;
    const GET_CLEAR_ORDERING: Ordering = Ordering::Acquire;

    /// Constructs a [`WakeFlag`] and paired [`WakeFlagListener`].
    ///
    /// If `wake_immediately` is true, then the waiting task will be woken on the first call
    /// to [`wait()`](Self::wait), even if no change has been received.
    #[must_use]
    pub fn new(wake_immediately: bool) -> (Self, WakeFlagListener) {
        let strong_alive = Arc::new(());
        let listeners_alive = Arc::downgrade(&strong_alive);
        let shared = Arc::new(WakeFlagShared {
            notified: AtomicBool::new(wake_immediately),
            listeners_alive,
            waker: AtomicWaker::new(),
        });
        let listener = WakeFlagListener {
            shared: Arc::downgrade(&shared),
            _alive: strong_alive,
        };
        (
            Self {
                shared,
                subscription: None,
            },
            listener,
        )
    }

    /// Constructs a [`WakeFlag`] with the given initial state and subscribes its listener
    /// to `source`.
    ///
    /// The subscription is owned by the returned flag, and ends when the flag is dropped.
    #[must_use]
    pub fn listening<S>(wake_immediately: bool, source: S) -> Self
    where
        S: Source,
        WakeFlagListener: IntoDynListener<S::Listener>,
    {
        let (mut flag, listener) = Self::new(wake_immediately);
        flag.subscription = Some(source.subscribe(listener));
        flag
    }

    /// Suspend the current async task until a change notification is received,
    /// one has already been received since the last call to `wait()`,
    /// or no more notifications can arrive.
    ///
    /// When a change notification is received, returns [`true`].
    /// When no more notifications will be received because all listeners have been dropped
    /// (for example, because the [`Store`](crate::Store) subscribed to was dropped),
    /// returns [`false`];
    /// afterward, calls to `wait()` will always immediately return [`false`].
    ///
    /// This function is “cancellation safe”: if the future is dropped before it completes,
    /// there is no effect on the state of the [`WakeFlag`], as if `wait()` had never been
    /// called at all.
    //---
    // Design note: The `&mut self` is solely to enforce non-concurrent usage
    // (because it would lead to lost signal bugs), not because of any actual mutation.
    #[inline]
    #[must_use]
    pub async fn wait(&mut self) -> bool {
        WakeFlagFuture {
            shared: &self.shared,
            done: false,
        }
        .await
    }

    /// Set the flag, causing the next call to [`wait()`](Self::wait) to return immediately.
    ///
    /// This is equivalent to calling `.changed()` on the listener, but can be done
    /// without access to the listener.
    /// It may be useful in situations where the task wishes to immediately wake again
    /// for some reason, without having separate logic for that.
    #[inline]
    pub fn notify(&self) {
        self.shared.notify_changed();
    }
}

impl Listener for WakeFlagListener {
    fn changed(&self) -> Result<(), ListenerError> {
        if let Some(shared) = self.shared.upgrade() {
            shared.notify_changed();
        }
        Ok(())
    }
}

impl Drop for WakeFlagListener {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.waker.wake();
        }
    }
}

impl Future for WakeFlagFuture<'_> {
    type Output = bool;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        assert!(!self.done);
        let poll_outcome = self.shared.poll(cx);
        if poll_outcome.is_ready() {
            self.get_mut().done = true;
        }
        poll_outcome
    }
}

impl WakeFlagShared {
    fn notify_changed(&self) {
        self.notified.store(true, WakeFlag::SET_ORDERING);
        self.waker.wake();
    }

    /// Shared logic between [`WakeFlagFuture::poll()`] and [`Stream::poll_next()`].
    fn poll(&self, cx: &mut Context<'_>) -> Poll<bool> {
        if let Some(answer) = self.get_and_clear() {
            return Poll::Ready(answer);
        }
        self.waker.register(cx.waker());
        if let Some(answer) = self.get_and_clear() {
            Poll::Ready(answer)
        } else {
            Poll::Pending
        }
    }

    fn get_and_clear(&self) -> Option<bool> {
        if self.notified.swap(false, WakeFlag::GET_CLEAR_ORDERING) {
            Some(true)
        } else if self.listeners_alive.strong_count() == 0 {
            Some(false)
        } else {
            None
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// As a [`Stream`], [`WakeFlag`] will produce `()` once for each time
/// [`WakeFlag::wait()`] would produce [`true`].
impl Stream for WakeFlag {
    type Item = ();

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.shared
            .poll(cx)
            .map(|alive| if alive { Some(()) } else { None })
    }
}

// -------------------------------------------------------------------------------------------------
