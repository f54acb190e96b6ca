use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::flavor;
use crate::tools::{capture_report, take_reports, Failing};
use tidings::{
    probe_fn, Bridge, Connectivity, ConnectivityAdapter, ConnectivityEvent, Counter, EventBus,
    Source as _,
};

const ONLINE: Connectivity = Connectivity { online: true };
const OFFLINE: Connectivity = Connectivity { online: false };

/// Simulated host: a reachability bit plus the event system that announces changes to it.
struct Host {
    reachable: Arc<AtomicBool>,
    events: flavor::EventBus,
}

impl Host {
    fn new(reachable: bool) -> Self {
        Self {
            reachable: Arc::new(AtomicBool::new(reachable)),
            events: EventBus::new(),
        }
    }

    fn adapter(&self) -> flavor::ConnectivityAdapter {
        ConnectivityAdapter::create(&self.events, self.reachable.clone())
    }

    fn go(&self, online: bool) {
        self.reachable.store(online, Ordering::Release);
        self.events.emit(if online {
            ConnectivityEvent::Gained
        } else {
            ConnectivityEvent::Lost
        });
    }
}

#[test]
fn initial_snapshot_from_probe() {
    assert_eq!(Host::new(true).adapter().snapshot(), ONLINE);
    assert_eq!(Host::new(false).adapter().snapshot(), OFFLINE);
}

#[test]
fn events_map_to_snapshots() {
    let host = Host::new(true);
    let adapter = host.adapter();
    let source = adapter.source();
    let counter = Counter::new();
    let _subscription = source.subscribe(counter.listener());

    host.go(false);
    assert_eq!(source.snapshot(), OFFLINE);
    assert_eq!(counter.take(), 1);

    host.go(true);
    assert_eq!(source.snapshot(), ONLINE);
    assert_eq!(counter.take(), 1);
}

/// The snapshot is recomputed from the probe, not from which event arrived.
#[test]
fn ambient_state_wins_over_event() {
    let host = Host::new(true);
    let adapter = host.adapter();
    let counter = Counter::new();
    let _subscription = adapter.source().subscribe(counter.listener());

    host.events.emit(ConnectivityEvent::Lost);
    assert_eq!(adapter.snapshot(), ONLINE);
    assert_eq!(counter.take(), 1);
}

#[test]
fn duplicate_events_publish_each_time() {
    let host = Host::new(true);
    let adapter = host.adapter();
    let counter = Counter::new();
    let _subscription = adapter.source().subscribe(counter.listener());

    host.go(false);
    host.go(false);
    assert_eq!(counter.take(), 2);
    assert_eq!(adapter.snapshot(), OFFLINE);
}

#[test]
fn dispose_deregisters_handlers() {
    let host = Host::new(true);
    let mut adapter = host.adapter();
    assert_eq!(host.events.handler_count(ConnectivityEvent::Gained), 1);
    assert_eq!(host.events.handler_count(ConnectivityEvent::Lost), 1);

    adapter.dispose();
    adapter.dispose();
    assert!(adapter.is_disposed());
    for event in ConnectivityEvent::ALL {
        assert_eq!(host.events.handler_count(event), 0);
    }

    host.go(false);
    assert_eq!(adapter.snapshot(), ONLINE);
}

#[test]
fn drop_disposes() {
    let host = Host::new(true);
    let adapter = host.adapter();
    let source = adapter.source();
    drop(adapter);
    for event in ConnectivityEvent::ALL {
        assert_eq!(host.events.handler_count(event), 0);
    }
    host.go(false);
    assert_eq!(source.snapshot(), ONLINE);
}

/// The event source does not keep the store alive.
#[test]
fn event_source_does_not_retain_store() {
    let host = Host::new(true);
    let adapter = host.adapter();
    let weak = Arc::downgrade(&adapter.source());
    drop(adapter);
    assert!(weak.upgrade().is_none());
}

#[test]
fn probe_fn_probe() {
    let events: flavor::EventBus = EventBus::new();
    let reachable = Arc::new(AtomicBool::new(false));
    let adapter: flavor::ConnectivityAdapter = ConnectivityAdapter::create(
        &events,
        probe_fn({
            let reachable = reachable.clone();
            move || reachable.load(Ordering::Acquire)
        }),
    );
    assert_eq!(adapter.snapshot(), OFFLINE);

    reachable.store(true, Ordering::Release);
    events.emit(ConnectivityEvent::Gained);
    assert_eq!(adapter.snapshot(), ONLINE);
}

#[test]
fn failing_consumer_is_isolated_and_reported() {
    let host = Host::new(true);
    let adapter: flavor::ConnectivityAdapter = ConnectivityAdapter::create_with_reporter(
        &host.events,
        host.reachable.clone(),
        capture_report,
    );
    let source = adapter.source();
    let _failing = source.subscribe(Failing);
    let counter = Counter::new();
    let _counting = source.subscribe(counter.listener());

    host.go(false);
    assert_eq!(counter.take(), 1);
    assert_eq!(take_reports(), vec!["listener failed: always fails"]);
}

#[test]
fn event_names() {
    assert_eq!(ConnectivityEvent::Gained.as_str(), "connectivity-gained");
    assert_eq!(ConnectivityEvent::Lost.to_string(), "connectivity-lost");
    assert_eq!(
        "connectivity-gained".parse::<ConnectivityEvent>(),
        Ok(ConnectivityEvent::Gained)
    );
    let error = "reachability-changed"
        .parse::<ConnectivityEvent>()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        r#"unknown connectivity event name "reachability-changed""#
    );
}

/// A consumer subscribes, sees a loss, unsubscribes, and is not told about the recovery.
#[test]
fn end_to_end() {
    let host = Host::new(true);
    let adapter = host.adapter();
    let counter = Counter::new();
    let subscription = adapter.source().subscribe(counter.listener());
    let bridge = Bridge::activate(adapter.source());

    assert_eq!(adapter.source().snapshot(), ONLINE);

    host.go(false);
    assert_eq!(counter.take(), 1);
    assert_eq!(adapter.source().snapshot(), OFFLINE);
    assert_eq!(bridge.take_changed(), Some(OFFLINE));

    subscription.unsubscribe();
    host.go(true);
    assert_eq!(counter.take(), 0);
    assert_eq!(adapter.source().snapshot(), ONLINE);
    assert_eq!(bridge.take_changed(), Some(ONLINE));
}
