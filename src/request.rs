// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of the request being debugged.

use std::collections::BTreeMap;

/// Name/value pairs shown in a report (headers, cookies, query parameters, ...).
pub type Params = BTreeMap<String, String>;

/// Accessors a report needs from the HTTP request (or CLI invocation).
///
/// Every accessor defaults to empty, so an adapter only implements what its
/// request type actually carries.
pub trait RequestInfo {
    fn server(&self) -> Params {
        Params::new()
    }

    fn headers(&self) -> Params {
        Params::new()
    }

    fn cookies(&self) -> Params {
        Params::new()
    }

    fn query(&self) -> Params {
        Params::new()
    }

    fn body(&self) -> Params {
        Params::new()
    }
}

/// A request with no metadata, e.g. for command-line runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRequest;

impl RequestInfo for NoRequest {}
