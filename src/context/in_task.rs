// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binding a future to a cooperative task identity.

use std::future::Future;
use std::pin::Pin;
use std::task::Poll;

use super::task::{self, TaskId};

/// A [`Future`] wrapper that makes `task` the current task during every poll.
///
/// Executors interleave many futures on one thread, and thread-local state set
/// by one of them would otherwise bleed into the next. `InTask` installs its
/// identity right before polling the inner future and restores the prior one
/// right after, so every suspension point is also a context switch for
/// [`RequestContext`](super::RequestContext).
///
/// ```rust
/// use reqdebug::context::{task, InTask, TaskId};
///
/// # test_executors::spin_on(async {
/// let id = TaskId::next();
/// let bound = InTask::new(id, async { task::current() });
/// assert_eq!(bound.task(), id);
/// let seen = bound.await;
/// assert_eq!(seen, Some(id));
/// assert_eq!(task::current(), None);
/// # });
/// ```
#[derive(Debug)]
pub struct InTask<F> {
    task: TaskId,
    future: F,
}

impl<F> InTask<F> {
    pub fn new(task: TaskId, future: F) -> Self {
        Self { task, future }
    }

    pub fn task(&self) -> TaskId {
        self.task
    }
}

impl<F> Future for InTask<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        // SAFETY: `future` is structurally pinned; it is never moved out of `self`.
        let (id, future) = unsafe {
            let this = self.get_unchecked_mut();
            (this.task, Pin::new_unchecked(&mut this.future))
        };
        // the guard also restores the prior task if the inner poll panics
        let _guard = task::enter(id);
        future.poll(cx)
    }
}

/// Adds [`in_task`](TaskFutureExt::in_task) to every future.
pub trait TaskFutureExt: Future + Sized {
    /// Runs this future as cooperative task `task`.
    fn in_task(self, task: TaskId) -> InTask<Self> {
        InTask::new(task, self)
    }
}

impl<F: Future> TaskFutureExt for F {}
