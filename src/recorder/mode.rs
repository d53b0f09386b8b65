// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execution models and debug levels.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How the embedding server runs requests, as named by its configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionModel {
    /// One request per worker process lifetime (`"fpm"`).
    Fpm,
    /// A command-line run (`"cli"`).
    Cli,
    /// Requests multiplexed as cooperative tasks in one process (`"swoole"`).
    Swoole,
}

impl ExecutionModel {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExecutionModel::Fpm => "fpm",
            ExecutionModel::Cli => "cli",
            ExecutionModel::Swoole => "swoole",
        }
    }
}

impl FromStr for ExecutionModel {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "fpm" => Ok(ExecutionModel::Fpm),
            "cli" => Ok(ExecutionModel::Cli),
            "swoole" => Ok(ExecutionModel::Swoole),
            other => Err(Error::UnknownExecutionModel {
                name: other.to_string(),
            }),
        }
    }
}

impl Display for ExecutionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved execution mode of one request, fixed at initialization.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    SingleProcess,
    CommandLine,
    /// The cooperative runtime, but initialized outside any task.
    CooperativeV1,
    /// The cooperative runtime, initialized inside a task.
    CooperativeV2,
}

impl Mode {
    /// Resolves `model` given whether the caller currently runs inside a task.
    pub fn resolve(model: ExecutionModel, in_task: bool) -> Mode {
        match model {
            ExecutionModel::Fpm => Mode::SingleProcess,
            ExecutionModel::Cli => Mode::CommandLine,
            ExecutionModel::Swoole if in_task => Mode::CooperativeV2,
            ExecutionModel::Swoole => Mode::CooperativeV1,
        }
    }

    /// Whether the process runs the cooperative runtime at all.
    pub fn is_cooperative(self) -> bool {
        matches!(self, Mode::CooperativeV1 | Mode::CooperativeV2)
    }

    /// Whether the request is one of many tasks sharing a thread.
    ///
    /// Process-wide hooks such as the profiler must stay off in that case.
    pub fn is_task_scheduled(self) -> bool {
        self == Mode::CooperativeV2
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::SingleProcess => "fpm",
            Mode::CommandLine => "cli",
            Mode::CooperativeV1 => "cooperative_v1",
            Mode::CooperativeV2 => "cooperative_v2",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the request asked to have reported.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DebugLevel {
    #[default]
    Off = 0,
    HtmlReport = 1,
    StructuredDump = 2,
    ProfileCapture = 3,
}

impl DebugLevel {
    pub fn is_on(self) -> bool {
        self != DebugLevel::Off
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for DebugLevel {
    type Error = u8;

    /// Maps the numeric levels `0..=3`; anything else is returned as the error.
    fn try_from(level: u8) -> Result<Self, u8> {
        match level {
            0 => Ok(DebugLevel::Off),
            1 => Ok(DebugLevel::HtmlReport),
            2 => Ok(DebugLevel::StructuredDump),
            3 => Ok(DebugLevel::ProfileCapture),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_models() {
        assert_eq!("fpm".parse::<ExecutionModel>().unwrap(), ExecutionModel::Fpm);
        assert_eq!("cli".parse::<ExecutionModel>().unwrap(), ExecutionModel::Cli);
        assert_eq!(
            "swoole".parse::<ExecutionModel>().unwrap(),
            ExecutionModel::Swoole
        );
    }

    #[test]
    fn rejects_unknown_models() {
        let err = "Swoole".parse::<ExecutionModel>().unwrap_err();
        assert!(matches!(err, Error::UnknownExecutionModel { ref name } if name == "Swoole"));
        assert_eq!(err.to_string(), "unknown execution model `Swoole`");
    }

    #[test]
    fn cooperative_mode_depends_on_task() {
        assert_eq!(Mode::resolve(ExecutionModel::Swoole, true), Mode::CooperativeV2);
        assert_eq!(Mode::resolve(ExecutionModel::Swoole, false), Mode::CooperativeV1);
        assert_eq!(Mode::resolve(ExecutionModel::Fpm, true), Mode::SingleProcess);
        assert!(Mode::CooperativeV1.is_cooperative());
        assert!(!Mode::CooperativeV1.is_task_scheduled());
        assert!(Mode::CooperativeV2.is_task_scheduled());
    }

    #[test]
    fn numeric_levels() {
        for level in 0..=3u8 {
            assert_eq!(DebugLevel::try_from(level).unwrap().as_u8(), level);
        }
        assert_eq!(DebugLevel::try_from(4), Err(4));
        assert!(!DebugLevel::default().is_on());
    }
}
