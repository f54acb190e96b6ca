use std::sync::{Arc, Mutex};

use super::flavor::Notifier;
use crate::tools::{capture_report, take_reports, Failing, Log};
use tidings::{listener_fn, Counter, Listener, ListenerError, Subscription};

#[test]
fn basics_and_debug() {
    let cn: Notifier = Notifier::new();
    assert_eq!(format!("{cn:?}"), "Notifier(0)");
    cn.notify();
    let counter = Counter::new();
    let subscription = cn.subscribe(counter.listener());
    assert_eq!(format!("{cn:?}"), "Notifier(1)");
    cn.notify();
    cn.notify();
    assert_eq!(counter.take(), 2);
    drop(subscription);
    assert_eq!(format!("{cn:?}"), "Notifier(0)");
}

#[test]
fn every_listener_notified_exactly_once() {
    let cn: Notifier = Notifier::new();
    let log = Log::new();
    let labels = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];
    let _subscriptions: Vec<Subscription> = labels
        .iter()
        .map(|&label| cn.subscribe(log.listener(label)))
        .collect();

    cn.notify();
    assert_eq!(log.drain_sorted(), labels);
}

#[test]
fn unsubscribe_is_idempotent() {
    let cn: Notifier = Notifier::new();
    let log = Log::new();
    let subscription = cn.subscribe(log.listener("x"));
    let _other = cn.subscribe(log.listener("y"));

    subscription.unsubscribe();
    subscription.unsubscribe();
    cn.notify();
    assert_eq!(log.drain_sorted(), vec!["y"]);
    assert_eq!(cn.count(), 1);
}

#[test]
fn duplicate_subscriptions_are_independent() {
    let cn: Notifier = Notifier::new();
    let counter = Counter::new();
    let listener = counter.listener();
    let first = cn.subscribe(listener.clone());
    let _second = cn.subscribe(listener);

    cn.notify();
    assert_eq!(counter.take(), 2);

    first.unsubscribe();
    cn.notify();
    assert_eq!(counter.take(), 1);
}

#[test]
fn failing_listener_does_not_stop_others() {
    let cn: Notifier = Notifier::with_reporter(capture_report);
    let log = Log::new();
    let _before = cn.subscribe(log.listener("before"));
    let failing = cn.subscribe(Failing);
    let _after = cn.subscribe(log.listener("after"));

    cn.notify();
    assert_eq!(log.drain_sorted(), vec!["after", "before"]);
    assert_eq!(take_reports(), vec!["listener failed: always fails"]);

    // The failing listener is not unsubscribed.
    assert!(failing.is_active());
    cn.notify();
    assert_eq!(take_reports().len(), 1);
}

#[cfg(feature = "std")]
#[test]
fn panicking_listener_does_not_stop_others() {
    let cn: Notifier = Notifier::with_reporter(capture_report);
    let log = Log::new();
    let _panicking = cn.subscribe(listener_fn(|| panic!("listener exploded")));
    let _after = cn.subscribe(log.listener("after"));

    cn.notify();
    assert_eq!(log.drain_sorted(), vec!["after"]);
    assert_eq!(take_reports(), vec!["listener panicked: listener exploded"]);
}

#[test]
fn close_drops_listeners() {
    #[derive(Debug)]
    struct DropDetector(Arc<()>);
    impl Listener for DropDetector {
        fn changed(&self) -> Result<(), ListenerError> {
            Ok(())
        }
    }

    let notifier: Notifier = Notifier::new();
    let detector = DropDetector(Arc::new(()));
    let weak = Arc::downgrade(&detector.0);
    let subscription = notifier.subscribe(detector);

    assert_eq!(weak.strong_count(), 1);
    notifier.close();
    assert_eq!(weak.strong_count(), 0);
    assert!(!subscription.is_active());

    // Notifying a closed notifier is allowed, and does nothing.
    notifier.notify();
}

/// Listeners subscribed during a round are not called until the next round.
#[test]
fn subscribe_during_notification() {
    let cn: Arc<Notifier> = Arc::new(Notifier::new());
    let log = Log::new();
    let added: Arc<Mutex<Vec<Subscription>>> = Arc::default();
    let _adder = cn.subscribe(listener_fn({
        let weak = Arc::downgrade(&cn);
        let log = log.clone();
        let added = added.clone();
        move || {
            if let Some(cn) = weak.upgrade() {
                added.lock().unwrap().push(cn.subscribe(log.listener("new")));
            }
        }
    }));

    cn.notify();
    assert_eq!(log.drain_sorted(), Vec::<&str>::new());
    cn.notify();
    assert_eq!(log.drain_sorted(), vec!["new"]);
    assert_eq!(cn.count(), 3);
}

/// A listener may unsubscribe itself while being notified.
#[test]
fn unsubscribe_self_during_notification() {
    let cn: Notifier = Notifier::new();
    let counter = Counter::new();
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::default();
    let subscription = cn.subscribe(listener_fn({
        let slot = slot.clone();
        let counter_listener = counter.listener();
        move || {
            counter_listener.changed().unwrap();
            if let Some(subscription) = slot.lock().unwrap().take() {
                subscription.unsubscribe();
            }
        }
    }));
    *slot.lock().unwrap() = Some(subscription);

    cn.notify();
    cn.notify();
    assert_eq!(counter.take(), 1);
    assert_eq!(cn.count(), 0);
}
