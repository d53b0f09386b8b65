// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record kinds a request accumulates.
//!
//! Each call record carries the fields a report table shows, plus an open
//! `info` value for whatever detail the calling driver wants to attach.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One SQL statement issued during the request.
///
/// ```rust
/// use reqdebug::SqlCall;
///
/// let call = SqlCall::new("SELECT 1", 0.002).with_mode("read");
/// assert_eq!(call.sql, "SELECT 1");
/// assert_eq!(call.mode.as_deref(), Some("read"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlCall {
    pub sql: String,
    /// Connection role or driver mode, e.g. `read` / `write`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Seconds spent.
    pub time: f64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub info: Value,
    /// The `EXPLAIN` output, when the driver collected one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<Value>,
}

impl SqlCall {
    pub fn new(sql: impl Into<String>, time: f64) -> Self {
        SqlCall {
            sql: sql.into(),
            time,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_info(mut self, info: Value) -> Self {
        self.info = info;
        self
    }

    pub fn with_explain(mut self, explain: Value) -> Self {
        self.explain = Some(explain);
        self
    }
}

/// One cache (key/value store) operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheCall {
    /// The command as issued, e.g. `GET user:42`.
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Seconds spent.
    pub cost: f64,
    /// Size of the reply in bytes.
    pub result_len: usize,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub info: Value,
}

impl CacheCall {
    pub fn new(op: impl Into<String>, cost: f64, result_len: usize) -> Self {
        CacheCall {
            op: op.into(),
            cost,
            result_len,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_info(mut self, info: Value) -> Self {
        self.info = info;
        self
    }
}

/// One outbound network call (HTTP client, RPC, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundCall {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Seconds spent.
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub info: Value,
}

impl OutboundCall {
    pub fn new(method: impl Into<String>, url: impl Into<String>, cost: f64) -> Self {
        OutboundCall {
            method: method.into(),
            url: url.into(),
            cost,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_info(mut self, info: Value) -> Self {
        self.info = info;
        self
    }
}

/// One link of a captured error chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedError {
    /// `Display` output.
    pub message: String,
    /// `Debug` output.
    pub detail: String,
    /// 0 for the error that was recorded, 1 for its source, and so on.
    pub depth: usize,
}

/// Hard cap on the number of captured links.
pub(crate) const MAX_CHAIN: usize = 256;

impl CapturedError {
    /// Captures `err` and every error reachable through [`StdError::source`],
    /// outermost first.
    ///
    /// The walk ends at the first source that was already visited, so a chain
    /// that loops back on itself is captured once. At most 256 links are kept;
    /// a longer chain is cut there and a warning is logged.
    pub fn chain(err: &(dyn StdError + 'static)) -> Vec<CapturedError> {
        let mut visited: Vec<&(dyn StdError + 'static)> = Vec::new();
        let mut next = Some(err);
        while let Some(current) = next {
            if visited.iter().any(|seen| same_error(*seen, current)) {
                break;
            }
            if visited.len() == MAX_CHAIN {
                let max = MAX_CHAIN as u64;
                logwise::warn_sync!("error chain cut after {max} links", max = max);
                break;
            }
            visited.push(current);
            next = current.source();
        }
        visited
            .into_iter()
            .enumerate()
            .map(|(depth, err)| CapturedError {
                message: err.to_string(),
                detail: format!("{err:?}"),
                depth,
            })
            .collect()
    }
}

/// Whether `a` and `b` are the same error value.
///
/// A wrapper and its first field share an address, so the address alone is not
/// enough. Vtables of one type are not guaranteed to be unique either, so when
/// they differ at a shared address the rendered error decides.
fn same_error(a: &(dyn StdError + 'static), b: &(dyn StdError + 'static)) -> bool {
    if !std::ptr::addr_eq(a, b) {
        return false;
    }
    std::ptr::eq(a, b) || (a.to_string() == b.to_string() && format!("{a:?}") == format!("{b:?}"))
}
