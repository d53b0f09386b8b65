// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-specific time types.
//!
//! On native platforms these come from `std::time`; on WASM they come from
//! `web_time`, since `std::time::Instant` panics in the browser.

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant, SystemTime};
#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant, SystemTime};
