// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-scoped key/value storage that follows the active execution model.
//!
//! Code deep inside a request handler usually has no handle to "the request".
//! This module lets it reach the right storage slot anyway: every operation on
//! [`RequestContext`] resolves, at the moment it runs, which slot corresponds to
//! "here and now".
//!
//! # Slot resolution
//!
//! - If the caller is running inside a cooperative task (a [`TaskId`] has been
//!   installed for the current poll by [`InTask`], or for the current scope by
//!   [`task::enter`]), the slot is the one keyed by that task id.
//! - Otherwise the slot is the single process-wide global slot, which is correct
//!   when a process serves one request at a time (FPM- or CLI-style execution).
//!
//! Resolution is never cached. A cooperative task that suspends at an `.await`
//! and is resumed later re-resolves on its next operation, and tasks polled in
//! between resolve to their own slots.
//!
//! ```rust
//! use reqdebug::context::{Key, Fields, RequestContext, TaskId, TaskFutureExt};
//!
//! const USER: Key<String> = Key::new("user");
//!
//! # test_executors::spin_on(async {
//! let handler = async {
//!     RequestContext::init(Fields::new().with(&USER, "alice".to_string()));
//!     assert_eq!(RequestContext::get(&USER, String::new()), "alice");
//! };
//! handler.in_task(TaskId::next()).await;
//! # });
//! ```
//!
//! # Slot lifetime
//!
//! [`RequestContext::init`] replaces the slot wholesale, so a task id that is
//! recycled for a new request never sees the previous request's fields.
//! [`RequestContext::release`] drops the slot outright, for runtimes whose task
//! ids are never reused.
//!
//! # Locking
//!
//! Each slot sits behind its own mutex and the task map behind another, so
//! [`RequestContext::update`] is a locked read-modify-write even when several
//! threads share a slot. The transform passed to `update` must not call back
//! into [`RequestContext`] for the same scope.

mod in_task;
mod key;
mod registry;
mod request_context;
pub mod task;


pub use in_task::{InTask, TaskFutureExt};
pub use key::{Fields, Key};
pub use request_context::{RequestContext, Scope};
pub use task::{TaskGuard, TaskId};
