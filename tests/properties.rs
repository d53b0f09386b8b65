// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use proptest::prelude::*;
use reqdebug::context::{Fields, Key, RequestContext, TaskId, task};
use reqdebug::{DebugRecorder, ExecutionModel, SqlCall};

#[derive(Debug)]
struct Link {
    depth: usize,
    source: Option<Box<Link>>,
}

impl Link {
    fn chain(len: usize) -> Link {
        let mut link = Link {
            depth: len - 1,
            source: None,
        };
        for depth in (0..len - 1).rev() {
            link = Link {
                depth,
                source: Some(Box::new(link)),
            };
        }
        link
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "link {}", self.depth)
    }
}

impl std::error::Error for Link {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

proptest! {
    #[test]
    fn output_is_the_concatenation(parts in prop::collection::vec(".{0,12}", 0..20)) {
        let _task = task::enter(TaskId::next());
        let recorder = DebugRecorder::new(true);
        recorder.initialize(ExecutionModel::Cli);
        for part in &parts {
            recorder.record_output(part).unwrap();
        }
        prop_assert_eq!(recorder.output(), parts.concat());
        RequestContext::release();
    }

    #[test]
    fn chain_of_n_records_n_entries(first in 1usize..40, second in 1usize..40) {
        let _task = task::enter(TaskId::next());
        let recorder = DebugRecorder::new(true);
        recorder.initialize(ExecutionModel::Fpm);
        recorder.record_exception(&Link::chain(first)).unwrap();
        recorder.record_exception(&Link::chain(second)).unwrap();
        recorder.enable(reqdebug::DebugLevel::HtmlReport).unwrap();

        let exceptions = recorder.snapshot(&reqdebug::NoRequest).exceptions;
        prop_assert_eq!(exceptions.len(), first + second);
        for (i, captured) in exceptions.iter().enumerate() {
            let depth = if i < first { i } else { i - first };
            prop_assert_eq!(captured.depth, depth);
            prop_assert_eq!(&captured.message, &format!("link {depth}"));
        }
        RequestContext::release();
    }

    #[test]
    fn sql_calls_preserve_insertion_order(times in prop::collection::vec(0.0f64..5.0, 0..30)) {
        let _task = task::enter(TaskId::next());
        let recorder = DebugRecorder::new(true);
        recorder.initialize(ExecutionModel::Swoole);
        recorder.enable(reqdebug::DebugLevel::StructuredDump).unwrap();
        for (n, time) in times.iter().enumerate() {
            recorder.record_sql_call(SqlCall::new(format!("SELECT {n}"), *time)).unwrap();
        }
        let calls = recorder.snapshot(&reqdebug::NoRequest).sql_calls;
        prop_assert_eq!(calls.len(), times.len());
        for (n, call) in calls.iter().enumerate() {
            prop_assert_eq!(&call.sql, &format!("SELECT {n}"));
            prop_assert_eq!(call.time, times[n]);
        }
        RequestContext::release();
    }

    #[test]
    fn init_leaves_no_trace_of_the_previous_request(old in any::<u64>(), fresh in any::<u64>()) {
        const OLD: Key<u64> = Key::new("old");
        const FRESH: Key<u64> = Key::new("fresh");
        let _task = task::enter(TaskId::next());
        RequestContext::init(Fields::new().with(&OLD, old));
        RequestContext::init(Fields::new().with(&FRESH, fresh));
        prop_assert!(!RequestContext::contains(&OLD));
        prop_assert_eq!(RequestContext::find(&FRESH), Some(fresh));
        RequestContext::release();
    }
}
