// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers shared by the unit tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

static GLOBAL_SLOT_GUARD: Mutex<()> = Mutex::new(());

/// Serializes tests that touch the process-wide global slot.
pub(crate) fn global_slot_guard() -> MutexGuard<'static, ()> {
    GLOBAL_SLOT_GUARD
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Returns `Pending` once, forcing a suspension point.
pub(crate) struct YieldNow(bool);

pub(crate) fn yield_now() -> YieldNow {
    YieldNow(false)
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Polls every future round-robin on the current thread until all complete.
pub(crate) fn run_interleaved<T>(mut futures: Vec<Pin<Box<dyn Future<Output = T>>>>) -> Vec<T> {
    let mut cx = Context::from_waker(Waker::noop());
    let mut results: Vec<Option<T>> = futures.iter().map(|_| None).collect();
    while results.iter().any(Option::is_none) {
        for (future, result) in futures.iter_mut().zip(results.iter_mut()) {
            if result.is_none() {
                if let Poll::Ready(value) = future.as_mut().poll(&mut cx) {
                    *result = Some(value);
                }
            }
        }
    }
    results.into_iter().flatten().collect()
}
