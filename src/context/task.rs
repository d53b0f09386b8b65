// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cooperative task identity.
//!
//! A thread polls at most one cooperative task at any instant, so "the current
//! task" is a thread-local that the scheduler glue ([`InTask`](super::InTask) or
//! [`enter`]) installs before resuming a task and restores afterwards.

use std::cell::Cell;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ids handed out by [`TaskId::next`] have this bit set, so they never collide
/// with caller-assigned worker or coroutine ids below it.
const ALLOCATED_BIT: u64 = 1 << 63;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static CURRENT_TASK: Cell<Option<TaskId>> = const { Cell::new(None) };
}

/// Identity of one cooperative task.
///
/// Identities may be recycled: a runtime that reuses coroutine ids can map each
/// one to a `TaskId` with [`TaskId::from_raw`]. The request context keys slots by
/// this value and relies on [`RequestContext::init`](super::RequestContext::init)
/// to wipe whatever a previous request left behind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps an id assigned by the embedding runtime.
    pub const fn from_raw(raw: u64) -> Self {
        TaskId(raw)
    }

    /// Allocates a process-unique id.
    pub fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed) | ALLOCATED_BIT)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 & ALLOCATED_BIT != 0 {
            write!(f, "#{}", self.0 & !ALLOCATED_BIT)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Returns the task currently being polled on this thread, if any.
#[inline]
pub fn current() -> Option<TaskId> {
    CURRENT_TASK.try_with(Cell::get).ok().flatten()
}

/// Whether the caller is running inside a cooperative task right now.
#[inline]
pub fn in_cooperative_task() -> bool {
    current().is_some()
}

fn replace_current(task: Option<TaskId>) -> Option<TaskId> {
    CURRENT_TASK
        .try_with(|cell| cell.replace(task))
        .ok()
        .flatten()
}

/// Marks `task` as the running task on this thread until the guard drops.
///
/// This is the hook for schedulers that resume tasks explicitly rather than
/// through [`Future::poll`]. Guards nest: dropping one restores whichever task
/// was current when it was created.
///
/// ```rust
/// use reqdebug::context::{task, TaskId};
///
/// assert_eq!(task::current(), None);
/// {
///     let _guard = task::enter(TaskId::from_raw(7));
///     assert_eq!(task::current(), Some(TaskId::from_raw(7)));
/// }
/// assert_eq!(task::current(), None);
/// ```
#[must_use = "the task is only current while the guard is alive"]
pub fn enter(task: TaskId) -> TaskGuard {
    TaskGuard {
        prior: replace_current(Some(task)),
        _not_send: PhantomData,
    }
}

/// Restores the previously current task on drop. See [`enter`].
#[derive(Debug)]
pub struct TaskGuard {
    prior: Option<TaskId>,
    // the guard manipulates a thread-local, so it must be dropped on the same thread
    _not_send: PhantomData<*const ()>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        replace_current(self.prior);
    }
}
