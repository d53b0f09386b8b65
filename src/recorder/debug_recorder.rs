// SPDX-License-Identifier: MIT OR Apache-2.0

//! The recorder: typed accumulation on top of [`RequestContext`].

use std::error::Error as StdError;
use std::sync::Arc;

use logwise::privacy::LogIt;

use super::mode::{DebugLevel, ExecutionModel, Mode};
use super::records::{CacheCall, CapturedError, OutboundCall, SqlCall};
use super::report::{ProfileCapture, ReportData, RequestMetadata};
use crate::clock::{Clock, SystemClock};
use crate::config::ConfigSource;
use crate::context::{Fields, Key, RequestContext, task};
use crate::error::{Error, ProfilerError, Result};
use crate::profiler::{self, Profiler};
use crate::request::RequestInfo;
use crate::sys::{Instant, SystemTime};

const START_TIME: Key<Instant> = Key::new("debug.start_time");
const STARTED_AT: Key<SystemTime> = Key::new("debug.started_at");
const MODE: Key<Mode> = Key::new("debug.mode");
const LEVEL: Key<DebugLevel> = Key::new("debug.level");
const OUTPUT: Key<String> = Key::new("debug.output");
const EXCEPTIONS: Key<Vec<CapturedError>> = Key::new("debug.exceptions");
const SQL_CALLS: Key<Vec<SqlCall>> = Key::new("debug.sql_calls");
const CACHE_CALLS: Key<Vec<CacheCall>> = Key::new("debug.cache_calls");
const OUTBOUND_CALLS: Key<Vec<OutboundCall>> = Key::new("debug.outbound_calls");
const PROFILING: Key<bool> = Key::new("debug.profiling");

/// Exit status used when [`DebugRecorder::initialize_named`] meets an unknown model.
pub const EXIT_UNKNOWN_MODEL: i32 = 78;

/// Collects diagnostics for the current request and produces its report.
///
/// A `DebugRecorder` holds only process-level collaborators: the deployment
/// configuration, an optional profiler hook and a clock. Everything about a
/// particular request lives in that request's [`RequestContext`] slot, so one
/// recorder serves every request in the process and can be shared freely (see
/// [`global_recorder`](crate::global_recorder)).
///
/// # Example
///
/// ```rust
/// use reqdebug::{DebugConfig, DebugLevel, DebugRecorder, ExecutionModel, NoRequest, SqlCall};
///
/// let recorder = DebugRecorder::new(DebugConfig::enabled());
/// # let _task = reqdebug::context::task::enter(reqdebug::context::TaskId::next());
/// recorder.initialize(ExecutionModel::Cli);
/// recorder.enable(DebugLevel::StructuredDump).unwrap();
///
/// recorder.record_sql_call(SqlCall::new("SELECT 1", 0.002)).unwrap();
/// recorder.record_sql_call(SqlCall::new("SELECT 2", 0.001)).unwrap();
///
/// let report = recorder.snapshot(&NoRequest);
/// assert_eq!(report.sql_calls.len(), 2);
/// assert_eq!(report.sql_calls[0].sql, "SELECT 1");
/// ```
#[derive(Debug, Clone)]
pub struct DebugRecorder {
    config: Arc<dyn ConfigSource>,
    profiler: Option<Arc<dyn Profiler>>,
    clock: Arc<dyn Clock>,
}

impl DebugRecorder {
    pub fn new(config: impl ConfigSource + 'static) -> Self {
        DebugRecorder {
            config: Arc::new(config),
            profiler: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_profiler(mut self, profiler: Arc<dyn Profiler>) -> Self {
        self.profiler = Some(profiler);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Starts a new request on the current scope with an empty diagnostic bag.
    ///
    /// Whatever a previous request on the same scope recorded is discarded,
    /// including a profile it left running.
    pub fn initialize(&self, model: ExecutionModel) -> Mode {
        self.discard_profile();
        let mode = Mode::resolve(model, task::in_cooperative_task());
        RequestContext::init(
            Fields::new()
                .with(&START_TIME, self.clock.now())
                .with(&STARTED_AT, self.clock.wall())
                .with(&MODE, mode)
                .with(&LEVEL, DebugLevel::Off)
                .with(&OUTPUT, String::new())
                .with(&EXCEPTIONS, Vec::new())
                .with(&SQL_CALLS, Vec::new())
                .with(&CACHE_CALLS, Vec::new())
                .with(&OUTBOUND_CALLS, Vec::new())
                .with(&PROFILING, false),
        );
        logwise::debuginternal_sync!("debug recorder initialized in mode {mode}", mode = mode.as_str());
        mode
    }

    /// Like [`initialize`](Self::initialize), taking the model's configured name.
    ///
    /// An unrecognized name terminates the process with [`EXIT_UNKNOWN_MODEL`]:
    /// guessing the concurrency model could attribute diagnostics to the wrong
    /// request. Use [`ExecutionModel::from_str`](std::str::FromStr::from_str) to
    /// handle the error instead.
    pub fn initialize_named(&self, name: &str) -> Mode {
        match name.parse::<ExecutionModel>() {
            Ok(model) => self.initialize(model),
            Err(err) => {
                logwise::error_sync!("cannot initialize debug recorder: {err}", err = err.to_string());
                std::process::exit(EXIT_UNKNOWN_MODEL)
            }
        }
    }

    /// Whether [`initialize`](Self::initialize) ran for the current scope.
    pub fn is_initialized(&self) -> bool {
        RequestContext::contains(&MODE)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        RequestContext::find(&MODE)
    }

    pub fn level(&self) -> DebugLevel {
        RequestContext::get(&LEVEL, DebugLevel::Off)
    }

    /// Selects what this request reports.
    ///
    /// [`DebugLevel::ProfileCapture`] also starts the profiler hook, unless the
    /// request is a task sharing its thread with others, where the hook is
    /// skipped. Any other level stops a hook this request started.
    pub fn enable(&self, level: DebugLevel) -> Result<()> {
        self.ensure_initialized()?;
        RequestContext::set(&LEVEL, level)?;
        if level == DebugLevel::ProfileCapture {
            match self.mode() {
                Some(mode) if mode.is_task_scheduled() => {
                    logwise::debuginternal_sync!("profiler not started: {mode} requests share their thread", mode = mode.as_str());
                }
                _ => self.start_profiler()?,
            }
        } else {
            self.discard_profile();
        }
        Ok(())
    }

    /// Turns reporting off for this request, stopping a running profiler.
    pub fn disable(&self) -> Result<()> {
        self.ensure_initialized()?;
        RequestContext::set(&LEVEL, DebugLevel::Off)?;
        self.discard_profile();
        Ok(())
    }

    /// Whether a report should be produced: the request asked for one and the
    /// deployment allows it.
    pub fn is_enabled(&self) -> bool {
        self.level().is_on() && self.config.debug_enabled()
    }

    /// Appends `err` and each of its sources, outermost first.
    ///
    /// Chains longer than 256 links are cut after the 256th.
    pub fn record_exception(&self, err: &(dyn StdError + 'static)) -> Result<()> {
        self.ensure_initialized()?;
        let chain = CapturedError::chain(err);
        RequestContext::update(&EXCEPTIONS, |mut exceptions: Vec<CapturedError>| {
            exceptions.extend(chain);
            exceptions
        })
    }

    /// Appends console-style output.
    pub fn record_output(&self, text: &str) -> Result<()> {
        self.ensure_initialized()?;
        RequestContext::update(&OUTPUT, |mut output: String| {
            output.push_str(text);
            output
        })
    }

    pub fn output(&self) -> String {
        RequestContext::get(&OUTPUT, String::new())
    }

    pub fn record_sql_call(&self, call: SqlCall) -> Result<()> {
        self.append(&SQL_CALLS, call)
    }

    pub fn record_cache_call(&self, call: CacheCall) -> Result<()> {
        self.append(&CACHE_CALLS, call)
    }

    pub fn record_outbound_call(&self, call: OutboundCall) -> Result<()> {
        self.append(&OUTBOUND_CALLS, call)
    }

    fn append<T: Send + 'static>(&self, key: &Key<Vec<T>>, item: T) -> Result<()> {
        self.ensure_initialized()?;
        RequestContext::update(key, |mut items: Vec<T>| {
            items.push(item);
            items
        })
    }

    /// Seconds since [`initialize`](Self::initialize), rounded to 4 decimals.
    ///
    /// Zero when the current scope was never initialized.
    pub fn elapsed_seconds(&self) -> f64 {
        let Some(start) = RequestContext::find(&START_TIME) else {
            return 0.0;
        };
        let elapsed = self.clock.now().saturating_duration_since(start);
        (elapsed.as_secs_f64() * 10_000.0).round() / 10_000.0
    }

    /// Collects the report for the current request.
    ///
    /// At [`DebugLevel::Off`] this is `ReportData::default()`; callers normally
    /// check [`is_enabled`](Self::is_enabled) first. At
    /// [`DebugLevel::ProfileCapture`] the profiler is stopped and its artifact
    /// persisted; a failure there is reported in [`ReportData::profile`] and
    /// does not affect the other fields.
    pub fn snapshot(&self, request: &dyn RequestInfo) -> ReportData {
        let level = self.level();
        if !level.is_on() {
            return ReportData::default();
        }
        let profile = if level == DebugLevel::ProfileCapture {
            self.finish_profile()
        } else {
            None
        };
        ReportData {
            mode: self.mode(),
            level,
            started_at: RequestContext::find(&STARTED_AT)
                .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
                .map(|d| d.as_secs_f64()),
            elapsed_seconds: self.elapsed_seconds(),
            output: self.output(),
            exceptions: RequestContext::get(&EXCEPTIONS, Vec::new()),
            sql_calls: RequestContext::get(&SQL_CALLS, Vec::new()),
            cache_calls: RequestContext::get(&CACHE_CALLS, Vec::new()),
            outbound_calls: RequestContext::get(&OUTBOUND_CALLS, Vec::new()),
            request: RequestMetadata::from_request(request),
            response: None,
            profile,
        }
    }

    fn start_profiler(&self) -> Result<()> {
        let Some(profiler) = &self.profiler else {
            logwise::debuginternal_sync!("profile capture requested without a profiler hook");
            return Ok(());
        };
        if RequestContext::get(&PROFILING, false) {
            return Ok(());
        }
        profiler.start()?;
        RequestContext::set(&PROFILING, true)
    }

    /// Stops the hook if this request started it.
    fn stop_profiler(&self) -> Option<Result<Vec<u8>, ProfilerError>> {
        if !RequestContext::get(&PROFILING, false) {
            return None;
        }
        let profiler = self.profiler.as_ref()?;
        if let Err(err) = RequestContext::set(&PROFILING, false) {
            return Some(Err(ProfilerError::Hook(err.to_string())));
        }
        Some(profiler.stop())
    }

    fn discard_profile(&self) {
        if let Some(Err(err)) = self.stop_profiler() {
            logwise::warn_sync!("discarding profile failed: {err}", err = err.to_string());
        }
    }

    fn finish_profile(&self) -> Option<ProfileCapture> {
        let outcome = self.stop_profiler()?.and_then(|profile| {
            let dir = match self.config.profile_output_dir() {
                Some(dir) => dir,
                None => profiler::default_output_dir().ok_or(ProfilerError::NoOutputDir)?,
            };
            let path = profiler::persist_artifact(&dir, &profile)?;
            Ok(ProfileCapture::Written {
                path,
                bytes: profile.len(),
            })
        });
        Some(outcome.unwrap_or_else(|err| {
            logwise::warn_sync!("profile capture failed: {err}", err = LogIt(&err));
            ProfileCapture::Failed {
                reason: err.to_string(),
            }
        }))
    }
}
