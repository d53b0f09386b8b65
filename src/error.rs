// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.
//!
//! Reads from the request context never fail, so every variant here describes a
//! write or lifecycle problem: writing before any slot exists, recording before
//! [`DebugRecorder::initialize`](crate::DebugRecorder::initialize), a typed key
//! colliding with a value of another type, or a profiler hook failure.

use crate::context::Scope;

/// Errors produced by the request context and the debug recorder.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A write was attempted for a scope that has no slot yet.
    #[error("no active request context for {scope}")]
    NoActiveContext { scope: Scope },

    /// A recording operation ran before the recorder initialized this scope.
    #[error("request context not initialized; call DebugRecorder::initialize first")]
    NotInitialized,

    /// The field exists but holds a value of a different type than the key.
    #[error("field `{key}` holds a value of a different type")]
    TypeMismatch { key: &'static str },

    /// The execution model name is not one of `fpm`, `cli` or `swoole`.
    #[error("unknown execution model `{name}`")]
    UnknownExecutionModel { name: String },

    #[error(transparent)]
    Profiler(#[from] ProfilerError),
}

/// Failures raised by a [`Profiler`](crate::Profiler) hook or while persisting its artifact.
#[derive(Debug, thiserror::Error)]
pub enum ProfilerError {
    #[error("profiler hook failed: {0}")]
    Hook(String),

    #[error("no profile output directory configured")]
    NoOutputDir,

    #[error("could not write profile artifact: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
