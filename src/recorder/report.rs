// SPDX-License-Identifier: MIT OR Apache-2.0

//! The read-only bundle handed to renderers.

use std::path::PathBuf;

use serde::Serialize;

use super::mode::{DebugLevel, Mode};
use super::records::{CacheCall, CapturedError, OutboundCall, SqlCall};
use crate::request::{Params, RequestInfo};

/// Request metadata copied out of a [`RequestInfo`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestMetadata {
    pub server: Params,
    pub headers: Params,
    pub cookies: Params,
    pub query: Params,
    pub body: Params,
}

impl RequestMetadata {
    pub fn from_request(request: &dyn RequestInfo) -> Self {
        RequestMetadata {
            server: request.server(),
            headers: request.headers(),
            cookies: request.cookies(),
            query: request.query(),
            body: request.body(),
        }
    }
}

/// Outcome of stopping the profiler at report time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileCapture {
    Written { path: PathBuf, bytes: usize },
    Failed { reason: String },
}

impl ProfileCapture {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ProfileCapture::Written { path, .. } => Some(path),
            ProfileCapture::Failed { .. } => None,
        }
    }
}

/// Everything a renderer needs for one request's debug report.
///
/// Produced by [`DebugRecorder::snapshot`](crate::DebugRecorder::snapshot).
/// A request whose level is [`DebugLevel::Off`] yields `ReportData::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportData {
    pub mode: Option<Mode>,
    pub level: DebugLevel,
    /// Unix time in seconds at which the request was initialized.
    pub started_at: Option<f64>,
    pub elapsed_seconds: f64,
    pub output: String,
    pub exceptions: Vec<CapturedError>,
    pub sql_calls: Vec<SqlCall>,
    pub cache_calls: Vec<CacheCall>,
    pub outbound_calls: Vec<OutboundCall>,
    pub request: RequestMetadata,
    /// The response body, when the caller attaches it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileCapture>,
}

impl ReportData {
    pub fn with_response(mut self, body: impl Into<String>) -> Self {
        self.response = Some(body.into());
        self
    }

    /// The structured dump format.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
