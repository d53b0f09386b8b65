// SPDX-License-Identifier: MIT OR Apache-2.0

//! A request from start to report, the way a server embeds the recorder.

logwise::declare_logging_domain!();

use std::sync::{Arc, Mutex};

use logwise::{InMemoryLogger, add_global_logger};
use reqdebug::context::{Key, RequestContext, Scope, TaskFutureExt, TaskId, task};
use reqdebug::{
    DebugConfig, DebugLevel, DebugRecorder, Error, ExecutionModel, Mode, Params, ProfileCapture,
    RequestInfo, RequestOutputLogger, SqlCall, global_recorder,
};
use test_executors::async_test;

#[cfg(target_arch = "wasm32")]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

/// Tests here that touch the global slot or the global loggers.
static GLOBAL_GUARD: Mutex<()> = Mutex::new(());

struct HttpRequest {
    path: &'static str,
}

impl RequestInfo for HttpRequest {
    fn server(&self) -> Params {
        [("REQUEST_URI".to_string(), self.path.to_string())].into()
    }

    fn cookies(&self) -> Params {
        [("session".to_string(), "abc".to_string())].into()
    }
}

#[async_test]
async fn structured_dump_of_a_task_request() {
    let config = DebugConfig::from_lookup(|var| match var {
        "REQDEBUG_ENABLED" => Some("on".to_string()),
        _ => None,
    });
    let recorder = DebugRecorder::new(config);

    let json = async {
        recorder.initialize_named("swoole");
        recorder.enable(DebugLevel::StructuredDump).unwrap();
        recorder
            .record_sql_call(SqlCall::new("SELECT * FROM users WHERE id = ?", 0.003).with_mode("read"))
            .unwrap();
        assert!(recorder.is_enabled());
        recorder
            .snapshot(&HttpRequest { path: "/users/7" })
            .with_response("<html></html>")
            .to_json_pretty()
            .unwrap()
    }
    .in_task(TaskId::next())
    .await;

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["mode"], "cooperative_v2");
    assert_eq!(value["level"], "structured_dump");
    assert_eq!(value["sql_calls"][0]["mode"], "read");
    assert_eq!(value["request"]["server"]["REQUEST_URI"], "/users/7");
    assert_eq!(value["request"]["cookies"]["session"], "abc");
    assert_eq!(value["response"], "<html></html>");
    assert!(value.get("profile").is_none());
}

#[test]
fn legacy_cooperative_mode_uses_the_global_slot() {
    let _guard = GLOBAL_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    assert!(!task::in_cooperative_task());
    let recorder = DebugRecorder::new(true);
    assert_eq!(recorder.initialize(ExecutionModel::Swoole), Mode::CooperativeV1);
    assert_eq!(RequestContext::current_scope(), Scope::Global);
    recorder.record_output("global").unwrap();

    // a task does not see the global slot
    {
        let _task = task::enter(TaskId::next());
        assert!(!recorder.is_initialized());
        assert_eq!(recorder.output(), "");
    }
    assert_eq!(recorder.output(), "global");
    assert!(RequestContext::release());
}

#[test]
fn profile_written_for_command_line_runs() {
    let _task = task::enter(TaskId::next());
    let dir = tempfile::tempdir().unwrap();

    #[derive(Debug)]
    struct Sampler;
    impl reqdebug::Profiler for Sampler {
        fn start(&self) -> Result<(), reqdebug::ProfilerError> {
            Ok(())
        }
        fn stop(&self) -> Result<Vec<u8>, reqdebug::ProfilerError> {
            Ok(vec![1, 2, 3])
        }
    }

    let recorder = DebugRecorder::new(DebugConfig::enabled().with_profile_output_dir(dir.path()))
        .with_profiler(Arc::new(Sampler));
    assert_eq!(recorder.initialize(ExecutionModel::Cli), Mode::CommandLine);
    recorder.enable(DebugLevel::ProfileCapture).unwrap();

    let report = recorder.snapshot(&reqdebug::NoRequest);
    match report.profile {
        Some(ProfileCapture::Written { ref path, bytes }) => {
            assert_eq!(bytes, 3);
            assert!(path.to_string_lossy().ends_with(reqdebug::profiler::ARTIFACT_SUFFIX));
        }
        ref other => panic!("unexpected profile outcome {other:?}"),
    }
}

#[test]
fn log_output_is_captured_per_request() {
    let _guard = GLOBAL_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    add_global_logger(Arc::new(RequestOutputLogger::new()));

    let _task = task::enter(TaskId::next());
    global_recorder().initialize(ExecutionModel::Fpm);
    logwise::warn_sync!("cache cold for {key}", key = "user:7");
    let output = global_recorder().output();
    assert!(output.contains("cache cold for"), "{output}");
    assert!(output.ends_with('\n'));
    RequestContext::release();
}

#[test]
fn type_mismatch_is_reported_and_logged() {
    let _guard = GLOBAL_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    let logger = Arc::new(InMemoryLogger::new());
    add_global_logger(logger.clone());

    let _task = task::enter(TaskId::next());
    const COUNT: Key<u32> = Key::new("app.count");
    const COUNT_AS_TEXT: Key<String> = Key::new("app.count");
    RequestContext::init(reqdebug::context::Fields::new().with(&COUNT, 1));

    let err = RequestContext::update(&COUNT_AS_TEXT, |s: String| s + "!").unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { key: "app.count" }));
    // the stored value survives a failed update
    assert_eq!(RequestContext::get(&COUNT, 0), 1);
    assert!(logger.drain_logs().contains("app.count"));
    RequestContext::release();
}
