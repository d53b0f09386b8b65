// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing log output into the current request's report.
//!
//! [`RequestOutputLogger`] is a `logwise` [`Logger`] that appends every finished
//! record to the output field of whichever request is current when the record
//! is emitted, giving the report a per-request console:
//!
//! ```rust
//! use logwise::global_logger::add_global_logger;
//! use reqdebug::RequestOutputLogger;
//! use std::sync::Arc;
//!
//! add_global_logger(Arc::new(RequestOutputLogger::new()));
//! ```
//!
//! Records emitted outside an initialized request have nowhere to go and are
//! dropped.

use std::future::Future;
use std::pin::Pin;

use logwise::{LogRecord, Logger};

use crate::global_recorder::global_recorder;

/// A [`Logger`] that writes into the current request's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RequestOutputLogger;

impl RequestOutputLogger {
    pub const fn new() -> Self {
        RequestOutputLogger
    }
}

impl Logger for RequestOutputLogger {
    fn finish_log_record(&self, record: LogRecord) {
        let recorder = global_recorder();
        if !recorder.is_initialized() {
            return;
        }
        let mut line = record.to_string();
        line.push('\n');
        // logging from inside a logger would recurse, so a failure is dropped
        let _ = recorder.record_output(&line);
    }

    fn finish_log_record_async<'s>(
        &'s self,
        record: LogRecord,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 's>> {
        Box::pin(async move { self.finish_log_record(record) })
    }

    fn prepare_to_die(&self) {
        // unbuffered
    }
}
