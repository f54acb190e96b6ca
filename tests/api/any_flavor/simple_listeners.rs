use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::flavor::Notifier;
use crate::tools::{capture_report, take_reports};
use tidings::{listener_fn, try_listener_fn, Counter, Flag, ListenerError, NullListener};

#[test]
fn null_listener_stays_registered() {
    let notifier: Notifier = Notifier::new();
    let subscription = notifier.subscribe(NullListener);
    notifier.notify();
    assert_eq!(notifier.count(), 1);
    drop(subscription);
    assert_eq!(notifier.count(), 0);
}

#[test]
fn flag_set_by_notification() {
    let notifier: Notifier = Notifier::new();
    let flag = Flag::new(false);
    let _subscription = notifier.subscribe(flag.listener());

    assert_eq!(flag.get_and_clear(), false);
    notifier.notify();
    notifier.notify();
    assert_eq!(flag.get_and_clear(), true);
    assert_eq!(flag.get_and_clear(), false);
}

#[test]
fn counter_counts_notifications() {
    let notifier: Notifier = Notifier::new();
    let counter = Counter::new();
    let _subscription = notifier.subscribe(counter.listener());

    for _ in 0..3 {
        notifier.notify();
    }
    assert_eq!(counter.take(), 3);
    assert_eq!(format!("{counter:?}"), "Counter(0)");
}

#[test]
fn fn_listener_called() {
    let notifier: Notifier = Notifier::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let _subscription = notifier.subscribe(listener_fn({
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::Relaxed);
        }
    }));

    notifier.notify();
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn try_fn_listener_error_reported() {
    let notifier: Notifier = Notifier::with_reporter(capture_report);
    let _subscription =
        notifier.subscribe(try_listener_fn(|| Err(ListenerError::new("no display"))));

    notifier.notify();
    assert_eq!(take_reports(), vec!["listener failed: no display"]);
}
