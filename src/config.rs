// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deployment-wide debug configuration.
//!
//! A request can ask for a debug report, but only a deployment that allows
//! debugging will produce one. [`ConfigSource`] is that kill switch, plus the
//! directory where profile artifacts land.

use std::fmt::Debug;
use std::path::PathBuf;

/// Supplies deployment-wide debug settings to a [`DebugRecorder`](crate::DebugRecorder).
pub trait ConfigSource: Debug + Send + Sync {
    /// Whether this deployment allows debug reports at all.
    fn debug_enabled(&self) -> bool;

    /// Where profile artifacts are written. `None` means the system temp directory.
    fn profile_output_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// A bare flag is enough configuration when artifacts may go to the temp dir.
impl ConfigSource for bool {
    fn debug_enabled(&self) -> bool {
        *self
    }
}

/// Plain configuration values, optionally read from the environment.
///
/// ```rust
/// use reqdebug::{ConfigSource, DebugConfig};
///
/// let config = DebugConfig::from_lookup(|var| match var {
///     "REQDEBUG_ENABLED" => Some("yes".to_string()),
///     _ => None,
/// });
/// assert!(config.debug_enabled());
/// assert_eq!(config.profile_output_dir(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugConfig {
    pub debug_enabled: bool,
    pub profile_output_dir: Option<PathBuf>,
}

impl DebugConfig {
    pub const ENABLED_VAR: &'static str = "REQDEBUG_ENABLED";
    pub const PROFILE_DIR_VAR: &'static str = "REQDEBUG_PROFILE_DIR";

    pub fn enabled() -> Self {
        DebugConfig {
            debug_enabled: true,
            profile_output_dir: None,
        }
    }

    pub fn with_profile_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_output_dir = Some(dir.into());
        self
    }

    /// Reads `REQDEBUG_ENABLED` and `REQDEBUG_PROFILE_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        DebugConfig {
            debug_enabled: lookup(Self::ENABLED_VAR).is_some_and(|v| parse_flag(&v)),
            profile_output_dir: lookup(Self::PROFILE_DIR_VAR)
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

impl ConfigSource for DebugConfig {
    fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    fn profile_output_dir(&self) -> Option<PathBuf> {
        self.profile_output_dir.clone()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |var| {
            pairs
                .iter()
                .find(|(k, _)| *k == var)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn flag_spellings() {
        for on in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(parse_flag(on), "{on}");
        }
        for off in ["", "0", "false", "off", "nope"] {
            assert!(!parse_flag(off), "{off}");
        }
    }

    #[test]
    fn lookup_reads_both_variables() {
        let config = DebugConfig::from_lookup(lookup(&[
            ("REQDEBUG_ENABLED", "1"),
            ("REQDEBUG_PROFILE_DIR", "/var/tmp/profiles"),
        ]));
        assert!(config.debug_enabled());
        assert_eq!(
            config.profile_output_dir(),
            Some(PathBuf::from("/var/tmp/profiles"))
        );
    }

    #[test]
    fn missing_variables_disable_debugging() {
        let config = DebugConfig::from_lookup(lookup(&[("REQDEBUG_PROFILE_DIR", "  ")]));
        assert_eq!(config, DebugConfig::default());
        assert_eq!(true.profile_output_dir(), None);
    }
}
