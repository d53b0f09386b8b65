// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request diagnostic accumulation and reporting.
//!
//! [`DebugRecorder`] keeps a fixed set of typed fields in the current
//! [`RequestContext`](crate::context::RequestContext) slot:
//!
//! | Field          | Type                    | Written by                         |
//! |----------------|-------------------------|------------------------------------|
//! | start time     | `Instant`, `SystemTime` | `initialize`                       |
//! | mode           | [`Mode`]                | `initialize`                       |
//! | level          | [`DebugLevel`]          | `enable` / `disable`               |
//! | output         | `String`                | `record_output` (concatenation)    |
//! | exceptions     | `Vec<CapturedError>`    | `record_exception` (whole chain)   |
//! | sql calls      | `Vec<SqlCall>`          | `record_sql_call`                  |
//! | cache calls    | `Vec<CacheCall>`        | `record_cache_call`                |
//! | outbound calls | `Vec<OutboundCall>`     | `record_outbound_call`             |
//!
//! Apart from the level, fields are only ever extended after `initialize`.
//!
//! # Levels
//!
//! A request starts at [`DebugLevel::Off`] and moves only through explicit
//! [`enable`](DebugRecorder::enable)/[`disable`](DebugRecorder::disable)
//! calls. Whatever level is active when [`snapshot`](DebugRecorder::snapshot)
//! runs decides the report. A report is only wanted when
//! [`is_enabled`](DebugRecorder::is_enabled) holds, which also requires the
//! deployment-wide switch from [`ConfigSource`](crate::ConfigSource).

mod debug_recorder;
mod mode;
mod records;
mod report;


pub use debug_recorder::{DebugRecorder, EXIT_UNKNOWN_MODEL};
pub use mode::{DebugLevel, ExecutionModel, Mode};
pub use records::{CacheCall, CapturedError, OutboundCall, SqlCall};
pub use report::{ProfileCapture, ReportData, RequestMetadata};
