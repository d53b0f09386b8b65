// SPDX-License-Identifier: MIT OR Apache-2.0

//! The profiler hook and its artifacts.
//!
//! Profiling is process-wide: a sampling profiler cannot attribute samples to
//! one of many interleaved cooperative tasks. The recorder therefore only
//! drives the hook for requests that own their thread (see
//! [`Mode::is_task_scheduled`](crate::Mode::is_task_scheduled)).

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::error::ProfilerError;

/// File name suffix of persisted profile artifacts.
pub const ARTIFACT_SUFFIX: &str = ".reqdebug.profile";

/// A start/stop profiling hook.
pub trait Profiler: Debug + Send + Sync {
    /// Begins capturing.
    fn start(&self) -> Result<(), ProfilerError>;

    /// Ends capturing and returns the serialized profile.
    fn stop(&self) -> Result<Vec<u8>, ProfilerError>;
}

/// Where artifacts go when no directory is configured: the system temp
/// directory, or `None` on `wasm32`, which has no filesystem.
pub fn default_output_dir() -> Option<PathBuf> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Some(std::env::temp_dir())
    }
    #[cfg(target_arch = "wasm32")]
    {
        None
    }
}

/// A fresh artifact path under `dir`: a random token plus [`ARTIFACT_SUFFIX`].
pub fn artifact_path(dir: &Path) -> PathBuf {
    let token = uuid::Uuid::new_v4().simple().to_string();
    dir.join(format!("{token}{ARTIFACT_SUFFIX}"))
}

/// Writes `profile` to a fresh [`artifact_path`] under `dir`.
pub fn persist_artifact(dir: &Path, profile: &[u8]) -> Result<PathBuf, ProfilerError> {
    let path = artifact_path(dir);
    std::fs::write(&path, profile)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_are_unique() {
        let dir = Path::new("/tmp");
        let a = artifact_path(dir);
        let b = artifact_path(dir);
        assert_ne!(a, b);
        assert!(a.to_string_lossy().ends_with(ARTIFACT_SUFFIX));
        assert_eq!(a.parent(), Some(dir));
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn default_dir_only_exists_with_a_filesystem() {
        let dir = default_output_dir();
        if cfg!(target_arch = "wasm32") {
            assert_eq!(dir, None);
        } else {
            assert_eq!(dir, Some(std::env::temp_dir()));
        }
    }

    #[test]
    fn persist_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = persist_artifact(dir.path(), b"profile").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"profile");
    }

    #[test]
    fn persist_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = persist_artifact(&missing, b"x").unwrap_err();
        assert!(matches!(err, ProfilerError::Io(_)));
    }
}
