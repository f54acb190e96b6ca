//! The tests in this module don't quite fit the uniform `any_flavor` model, so they are
//! not in that group.

use std::rc::Rc;
use std::sync::Arc;

use tidings::{sync, unsync, Counter, Flag, IntoDynListener as _, Listener as _, NullListener};
use tidings::{Constant, Source};

#[test]
fn dyn_source_is_possible() {
    let constant: unsync::Constant<u8> = Constant::new(1);
    let dyn_source: &dyn Source<Value = u8, Listener = unsync::DynListener> = &constant;

    // This is a direct trait object method call.
    let direct = dyn_source.subscribe_raw(NullListener.into_dyn_listener());

    // This uses `impl Source for &T` to be able to use the generic `subscribe()` method.
    let generic = (&dyn_source).subscribe(NullListener);

    assert_eq!(dyn_source.snapshot(), 1);
    assert!(!direct.is_active());
    assert!(!generic.is_active());
}

#[test]
fn dyn_listener_unsync() {
    let counter = Counter::new();
    let listener: unsync::DynListener = counter.listener().into_dyn_listener();

    // Should not gain a new wrapper when converted again.
    assert_eq!(
        Rc::as_ptr(&listener),
        Rc::as_ptr(&listener.clone().into_dyn_listener())
    );

    // Should deliver (and not infinitely recurse).
    listener.changed().unwrap();
    assert_eq!(counter.take(), 1);

    // Should still succeed once the counter is gone.
    drop(counter);
    assert!(listener.changed().is_ok());
}

#[test]
fn dyn_listener_sync() {
    // Flag is always Send + Sync so is ok to use in this test
    // without making it conditional.
    let flag = Flag::new(false);
    let listener: sync::DynListener = flag.listener().into_dyn_listener();

    // Should not gain a new wrapper when converted again.
    assert_eq!(
        Arc::as_ptr(&listener),
        Arc::as_ptr(&listener.clone().into_dyn_listener())
    );

    assert_eq!(flag.get_and_clear(), false);
    listener.changed().unwrap();
    assert_eq!(flag.get_and_clear(), true);

    drop(flag);
    assert!(listener.changed().is_ok());
}

/// Demonstrate that [`DynListener`] implements [`fmt::Debug`].
#[test]
fn dyn_listener_debug_unsync() {
    let flag = Flag::new(false);
    let listener: unsync::DynListener = Rc::new(flag.listener());

    assert_eq!(
        format!("{listener:?}"),
        "FlagListener { alive: true, value: false }"
    );
    drop(flag);
    assert_eq!(format!("{listener:?}"), "FlagListener { alive: false }");
}

/// Demonstrate that [`DynListener`] implements [`fmt::Debug`].
#[test]
fn dyn_listener_debug_sync() {
    let counter = Counter::new();
    let listener: sync::DynListener = Arc::new(counter.listener());

    assert_eq!(format!("{listener:?}"), "CounterListener { alive: true }");
    drop(counter);
    assert_eq!(format!("{listener:?}"), "CounterListener { alive: false }");
}
