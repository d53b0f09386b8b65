// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide recorder.
//!
//! Database drivers, cache clients and HTTP clients several layers below a
//! request handler want to record their calls without a recorder being
//! threaded through every signature. They reach the recorder installed here:
//!
//! ```
//! use reqdebug::{global_recorder, set_global_recorder, DebugConfig, DebugRecorder};
//! use std::sync::Arc;
//!
//! // at startup
//! set_global_recorder(Arc::new(DebugRecorder::new(DebugConfig::from_env())));
//!
//! // anywhere, later
//! let recorder = global_recorder();
//! # let _ = recorder;
//! ```
//!
//! Because request state lives in [`RequestContext`](crate::context::RequestContext)
//! slots rather than in the recorder, swapping the recorder does not disturb
//! requests in flight; they simply see the new collaborators on their next call.
//!
//! The default recorder reads its configuration from the environment
//! ([`DebugConfig::from_env`]) and has no profiler.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::config::DebugConfig;
use crate::recorder::DebugRecorder;

static GLOBAL_RECORDER: OnceLock<RwLock<Arc<DebugRecorder>>> = OnceLock::new();

fn global_slot() -> &'static RwLock<Arc<DebugRecorder>> {
    GLOBAL_RECORDER.get_or_init(|| RwLock::new(Arc::new(DebugRecorder::new(DebugConfig::from_env()))))
}

/// Returns the installed recorder, creating the default on first use.
pub fn global_recorder() -> Arc<DebugRecorder> {
    global_slot()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Installs `recorder` process-wide and returns the one it replaces.
pub fn set_global_recorder(recorder: Arc<DebugRecorder>) -> Arc<DebugRecorder> {
    let mut slot = global_slot().write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, recorder)
}
