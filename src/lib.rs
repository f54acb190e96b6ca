#![no_std]

//! Library for keeping a snapshot of externally-changing state, and telling interested parties
//! when it changes.
//!
//! # What `tidings` does
//!
//! Many programs have some piece of state that is owned by the outside world (whether the
//! network is reachable, say, or which window has focus), and several internal consumers who
//! need to present that state.
//! `tidings` provides the small amount of machinery for that situation:
//!
//! * A [`Store`] holds the current *snapshot*: an immutable value which is replaced wholesale,
//!   never edited in place, each time the state changes.
//! * Any number of [`Listener`]s may be *subscribed* to the store through its [`Source`]
//!   handle. Each subscription returns a [`Subscription`] token which removes exactly that
//!   registration.
//! * When a new snapshot is *published*, every currently subscribed listener is told once
//!   that something changed. Listeners are not given the new value; they read it with
//!   [`Source::snapshot()`] when they are ready to.
//! * A change-source adapter such as [`ConnectivityAdapter`] connects a store to an external
//!   event system, recomputing the snapshot from ambient state whenever an event arrives.
//! * A [`Bridge`] is the consumer side: it subscribes once, re-reads the snapshot on
//!   request or on notification, and unsubscribes exactly once when deactivated.
//!
//! Listener failures are isolated: a listener which returns an error (or, with the `"std"`
//! feature, panics) does not prevent the other listeners from being notified.
//! The failure is passed to the store's [`Reporter`], which by default emits a `tracing`
//! event.
//!
//! # Getting started
//!
//! The types in this library are generic over whether they are <code>[Send] + [Sync]</code>
//! and require the listeners they contain to be too. For convenience, a set of
//! less-generic type aliases is available in the [`sync`] and [`unsync`] modules.
//!
//! ```
//! use tidings::{Counter, Source as _};
//! use tidings::unsync::Store;
//!
//! let store: Store<u32> = Store::new(1);
//! let source = store.as_source();
//!
//! let counter = Counter::new();
//! let subscription = source.subscribe(counter.listener());
//!
//! store.publish(2);
//! assert_eq!(counter.take(), 1);
//! assert_eq!(source.snapshot(), 2);
//!
//! subscription.unsubscribe();
//! store.publish(3);
//! assert_eq!(counter.take(), 0);
//! ```
//!
//! # Features and platform requirements
//!
//! `tidings` is compatible with `no_std` platforms which have the `alloc` crate and
//! pointer-sized atomics.
//!
//! The following Cargo feature flags are defined:
//!
//! * `"async"`:
//!   Add functionality for `async` programming,
//!   currently consisting of the
#![cfg_attr(feature = "async", doc = "[`future`]")]
#![cfg_attr(not(feature = "async"), doc = "`future`")]
//! module.
//!
//! * `"std"`:
//!   Catch panics from listeners and report them instead of unwinding through the
//!   publisher, and enable `std` support in `tracing` and `thiserror`.
//!
//! * `"sync"`:
//!   Makes use of [`std::sync`] to add [`Sync`] to [`Notifier`], [`Store`] and [`EventBus`],
//!   and adds the thread-safe type aliases in [`sync`]. Implies `"std"`.
#![cfg_attr(not(feature = "std"), doc = " [`std`]: https://doc.rust-lang.org/std/")]
#![cfg_attr(
    not(feature = "std"),
    doc = " [`std::sync`]: https://doc.rust-lang.org/std/sync/"
)]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(explicit_outlives_requirements)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(redundant_lifetimes)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unnameable_types)]
#![warn(unused_extern_crates)]
#![warn(unused_lifetimes)]
#![warn(unreachable_pub)]
#![warn(
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc
)]
#![warn(clippy::assigning_clones)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::exhaustive_enums)]
#![warn(clippy::exhaustive_structs)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::module_name_repetitions)]
#![warn(clippy::pedantic)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::should_panic_without_expect)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::unnecessary_wraps)]
#![allow(clippy::bool_assert_comparison, reason = "less legible")]
#![allow(clippy::explicit_auto_deref)]
#![allow(clippy::explicit_iter_loop)]
#![allow(clippy::semicolon_if_nothing_returned, reason = "explicit delegation")]
#![cfg_attr(test, allow(clippy::arc_with_non_send_sync))]

// -------------------------------------------------------------------------------------------------

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

// -------------------------------------------------------------------------------------------------

mod bridge;
pub use bridge::{Bridge, RefreshListener};

mod connectivity;
pub use connectivity::{
    probe_fn, Connectivity, ConnectivityAdapter, ConnectivityEvent, ConnectivityHandler,
    EventBus, EventSource, Probe, ProbeFn,
};

mod error;
pub use error::{report_with_tracing, ListenerError, ListenerFailure, ParseEventError, Reporter};

#[cfg(feature = "async")]
pub mod future;

mod listener;
pub use listener::{IntoDynListener, Listener};

mod maybe_sync;

mod notifier;
pub use notifier::Notifier;

mod simple_listeners;
pub use simple_listeners::{
    listener_fn, try_listener_fn, Counter, CounterListener, Flag, FlagListener, FnListener,
    NullListener, TryFnListener,
};

mod source;
pub use source::{Constant, Source};

mod store;
pub use store::{Store, StoreSource};

mod subscription;
pub use subscription::Subscription;

mod util;

// -------------------------------------------------------------------------------------------------

/// Type aliases for use in applications where listeners are expected to implement [`Sync`].
///
/// Some of the items in this module are only available with the `"sync"` feature.
pub mod sync {
    use crate::{Listener, Source};
    use alloc::sync::Arc;
    use core::fmt;

    #[cfg(doc)]
    use crate::unsync;

    /// Type-erased form of a [`Listener`].
    ///
    /// This type is [`Send`] and [`Sync`]. When that is not satisfiable, use
    /// [`unsync::DynListener`] instead.
    pub type DynListener = Arc<dyn Listener + Send + Sync>;

    /// Type-erased form of a [`Source`] whose snapshots are of type `T`.
    ///
    /// This type is [`Send`] and [`Sync`]. When that is not satisfiable, use
    /// [`unsync::DynSource`] instead.
    pub type DynSource<T> = Arc<dyn Source<Value = T, Listener = DynListener> + Send + Sync>;

    /// Listener registry.
    ///
    /// This type is [`Send`] and [`Sync`] and therefore requires all its [`Listener`]s to be so.
    /// When this requirement is undesired, use [`unsync::Notifier`] instead.
    #[cfg(feature = "sync")]
    pub type Notifier = crate::Notifier<DynListener>;

    /// Holder of a snapshot which notifies when it is replaced.
    ///
    /// This type is [`Send`] and [`Sync`] and therefore requires its [`Listener`]s be so.
    /// When this requirement is undesired, use [`unsync::Store`] instead.
    #[cfg(feature = "sync")]
    pub type Store<T> = crate::Store<T, DynListener>;

    /// [`Store::as_source()`] implementation.
    #[cfg(feature = "sync")]
    pub type StoreSource<T> = Arc<crate::StoreSource<T, DynListener>>;

    /// In-memory connectivity event source.
    #[cfg(feature = "sync")]
    pub type EventBus = crate::EventBus<DynListener>;

    /// Adapter from connectivity events to a [`Store`] of
    /// [`Connectivity`](crate::Connectivity).
    #[cfg(feature = "sync")]
    pub type ConnectivityAdapter = crate::ConnectivityAdapter<DynListener>;

    /// A [`Source`] of a constant value.
    ///
    /// This type is [`Send`] and [`Sync`] and therefore requires its [`Listener`]s be so.
    /// When this requirement is undesired, use [`unsync::Constant`] instead.
    pub type Constant<T> = crate::Constant<T, DynListener>;

    /// Returns a [`DynSource`] with a constant value.
    pub fn constant<T: Clone + Send + Sync + fmt::Debug + 'static>(value: T) -> DynSource<T> {
        Arc::new(Constant::new(value))
    }
}

/// Type aliases for use in applications where listeners are not expected to implement [`Sync`].
#[cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
pub mod unsync {
    use crate::{Listener, Source};
    use alloc::rc::Rc;
    use alloc::sync::Arc;
    use core::fmt;

    #[cfg(doc)]
    use crate::sync;

    /// Type-erased form of a [`Listener`].
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::DynListener`] instead.
    pub type DynListener = Rc<dyn Listener>;

    /// Type-erased form of a [`Source`] whose snapshots are of type `T`.
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::DynSource`] instead.
    ///
    /// It uses [`Arc`] rather than [`Rc`] so that [`Store::as_source()`] has the same
    /// return type in both flavors and can be coerced to either `DynSource` without
    /// another layer of indirection.
    pub type DynSource<T> = Arc<dyn Source<Value = T, Listener = DynListener>>;

    /// Listener registry.
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::Notifier`] instead.
    pub type Notifier = crate::Notifier<DynListener>;

    /// Holder of a snapshot which notifies when it is replaced.
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::Store`] instead.
    pub type Store<T> = crate::Store<T, DynListener>;

    /// [`Store::as_source()`] implementation.
    pub type StoreSource<T> = Arc<crate::StoreSource<T, DynListener>>;

    /// In-memory connectivity event source.
    pub type EventBus = crate::EventBus<DynListener>;

    /// Adapter from connectivity events to a [`Store`] of
    /// [`Connectivity`](crate::Connectivity).
    pub type ConnectivityAdapter = crate::ConnectivityAdapter<DynListener>;

    /// A [`Source`] of a constant value.
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::Constant`] instead.
    pub type Constant<T> = crate::Constant<T, DynListener>;

    /// Returns a [`DynSource`] with a constant value.
    pub fn constant<T: Clone + fmt::Debug + 'static>(value: T) -> DynSource<T> {
        Arc::new(Constant::new(value))
    }
}
