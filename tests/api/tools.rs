use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use tidings::{Listener, ListenerError, ListenerFailure};

// -------------------------------------------------------------------------------------------------

/// Shared record of which listeners were called, by label.
///
/// Always `Send + Sync`, so that it can be used with either flavor.
#[derive(Clone, Debug, Default)]
pub(crate) struct Log(Arc<Mutex<Vec<&'static str>>>);

#[derive(Debug)]
pub(crate) struct LogListener {
    log: Log,
    label: &'static str,
}

impl Log {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn listener(&self, label: &'static str) -> LogListener {
        LogListener {
            log: self.clone(),
            label,
        }
    }

    /// Returns the labels recorded since the last call, sorted, since delivery order is
    /// unspecified.
    pub(crate) fn drain_sorted(&self) -> Vec<&'static str> {
        let mut labels = std::mem::take(&mut *self.0.lock().unwrap());
        labels.sort_unstable();
        labels
    }
}

impl Listener for LogListener {
    fn changed(&self) -> Result<(), ListenerError> {
        self.log.0.lock().unwrap().push(self.label);
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// A listener which always fails.
#[derive(Debug)]
pub(crate) struct Failing;

impl Listener for Failing {
    fn changed(&self) -> Result<(), ListenerError> {
        Err(ListenerError::new("always fails"))
    }
}

thread_local! {
    static REPORTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// [`tidings::Reporter`] which records failures for [`take_reports()`].
///
/// Failures are recorded per thread, so that tests running in parallel do not see each
/// other's reports.
pub(crate) fn capture_report(failure: &ListenerFailure<'_>) {
    REPORTS.with_borrow_mut(|reports| reports.push(failure.error().to_string()));
}

pub(crate) fn take_reports() -> Vec<String> {
    REPORTS.with_borrow_mut(std::mem::take)
}

// -------------------------------------------------------------------------------------------------

#[cfg_attr(not(feature = "async"), allow(dead_code))]
pub(crate) async fn yield_now() {
    let mut yielded = false;
    core::future::poll_fn(move |ctx| {
        if yielded {
            core::task::Poll::Ready(())
        } else {
            yielded = true;
            ctx.waker().wake_by_ref();
            core::task::Poll::Pending
        }
    })
    .await
}

/// Run a future to completion, but don't block if it doesn't wake, under the assumption that
/// that indicates a lost-signal bug.
#[cfg_attr(not(feature = "async"), allow(dead_code))]
pub(crate) fn run_task_without_waiting(future: impl core::future::Future<Output = ()> + 'static) {
    use futures::task::LocalSpawnExt as _;

    let mut executor = futures::executor::LocalPool::new();
    executor.spawner().spawn_local(future).unwrap();
    assert!(executor.try_run_one(), "Test stalled");
}
