use core::future::Future as _;
use core::pin::pin;
use core::task::{Context, Poll};

use futures::task::noop_waker_ref; // TODO: we can replace this with Waker::noop() when MSRV is Rust 1.85

use tidings::future::WakeFlag;
use tidings::{unsync, Listener as _, Source as _};

use crate::tools::{run_task_without_waiting, yield_now};

// -------------------------------------------------------------------------------------------------

/// Basic functionality test using only `poll()` and ignoring wakers.
#[test]
fn wake_flag_polling() {
    let ctx = &mut Context::from_waker(noop_waker_ref());
    let (mut flag, listener) = WakeFlag::new(true);

    // First poll succeeds immediately because we initialized with true.
    assert_eq!(pin!(flag.wait()).as_mut().poll(ctx), Poll::Ready(true));

    {
        // Second poll of a new future returns Pending.
        let mut future = pin!(flag.wait());
        assert_eq!(future.as_mut().poll(ctx), Poll::Pending);

        // When a change is received, then polling will return Ready(true).
        listener.changed().unwrap();
        assert_eq!(future.as_mut().poll(ctx), Poll::Ready(true));
    }

    // When the listener is dropped, then polling will return Ready(false).
    drop(listener);
    assert_eq!(pin!(flag.wait()).as_mut().poll(ctx), Poll::Ready(false));
}

/// A task which mirrors one store into another, woken only by notifications.
#[test]
fn wake_flag_drives_task() {
    let input: unsync::Store<i32> = unsync::Store::new(0);
    let input_source = input.as_source();
    let output: unsync::Store<i32> = unsync::Store::new(0);
    let output_source = output.as_source();

    let mut flag = WakeFlag::listening(true, input_source.clone());
    run_task_without_waiting(async move {
        let worker = async {
            while flag.wait().await {
                output.publish_if_changed(input_source.snapshot() * 10);
            }
        };
        let driver = async {
            yield_now().await;
            assert_eq!(output_source.snapshot(), 0);

            input.publish(1);
            yield_now().await;
            assert_eq!(output_source.snapshot(), 10);

            // Ends the worker's loop.
            drop(input);
        };
        futures::join!(worker, driver);
    });
}
