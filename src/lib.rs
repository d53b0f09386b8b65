//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# reqdebug

reqdebug collects per-request diagnostics (timings, SQL/cache/outbound call logs, captured errors,
console-style output) and hands them to whatever renders your debug page.

# The problem

Accumulating diagnostics is trivial.  Attributing them to the right request is not.

* In a process-per-request server (FPM-style workers, a CLI run) there is exactly one request alive,
  so "the current request" can be a global.
* In a server that multiplexes many requests as cooperative tasks on a few threads, a global would mix
  every request's SQL log together.  Worse, a task can suspend in the middle of a request, another task
  runs, and the first one resumes later.

Code that records diagnostics (a database driver, an HTTP client) sits far below the request handler and
should not have to know which world it is running in.

# The design

[`context::RequestContext`] is a key/value store whose every operation resolves, right then, which slot
is "the current request":

| Running inside...              | Slot                          |
|--------------------------------|-------------------------------|
| a cooperative task             | the slot keyed by its [`context::TaskId`] |
| anything else                  | the single global slot        |

The current task is a thread-local installed around every poll by [`context::InTask`] (or around a
synchronous resume by [`context::task::enter`]).  Since resolution is never cached, a task switch at an
`.await` is also a slot switch.

[`DebugRecorder`] layers a typed diagnostic bag on top: [`initialize`](DebugRecorder::initialize) starts a
request, the `record_*` methods append, and [`snapshot`](DebugRecorder::snapshot) produces a [`ReportData`]
for the renderer.

```rust
use reqdebug::{DebugConfig, DebugLevel, DebugRecorder, ExecutionModel, NoRequest, SqlCall};
use reqdebug::context::{TaskFutureExt, TaskId};

let recorder = DebugRecorder::new(DebugConfig::enabled());

# test_executors::spin_on(async {
let request = async {
    recorder.initialize(ExecutionModel::Swoole);
    recorder.enable(DebugLevel::HtmlReport).unwrap();
    recorder.record_sql_call(SqlCall::new("SELECT 1", 0.002)).unwrap();
    recorder.record_output("hello from the handler").unwrap();
    assert!(recorder.is_enabled());
    recorder.snapshot(&NoRequest)
};
let report = request.in_task(TaskId::next()).await;
assert_eq!(report.sql_calls.len(), 1);
assert_eq!(report.output, "hello from the handler");
# });
```

# Execution models

[`DebugRecorder::initialize`] takes the server's [`ExecutionModel`] (`fpm`, `cli` or `swoole`) and records
the resolved [`Mode`].  An unknown model name passed to [`DebugRecorder::initialize_named`] terminates the
process: running with a guessed concurrency model risks attributing one request's data to another.

# Profiling

At [`DebugLevel::ProfileCapture`] the recorder drives a [`Profiler`] hook and persists its artifact at report
time.  The hook is process-wide, so it is skipped for requests that share their thread with other tasks.

# Logging

reqdebug logs through [logwise](https://crates.io/crates/logwise).  [`RequestOutputLogger`] goes the other
way, capturing logwise output into the current request's report.
*/

logwise::declare_logging_domain!();

mod clock;
mod config;
pub mod context;
mod error;
mod global_recorder;
mod output_logger;
pub mod profiler;
mod recorder;
mod request;
mod sys;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigSource, DebugConfig};
pub use error::{Error, ProfilerError, Result};
pub use global_recorder::{global_recorder, set_global_recorder};
pub use output_logger::RequestOutputLogger;
pub use profiler::Profiler;
pub use recorder::{
    CacheCall, CapturedError, DebugLevel, DebugRecorder, EXIT_UNKNOWN_MODEL, ExecutionModel, Mode,
    OutboundCall, ProfileCapture, ReportData, RequestMetadata, SqlCall,
};
pub use request::{NoRequest, Params, RequestInfo};
