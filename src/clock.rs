// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time sources for request timing.

use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::sys::{Duration, Instant, SystemTime};

/// Where the recorder reads the time from.
pub trait Clock: Debug + Send + Sync {
    /// Monotonic time, used for elapsed durations.
    fn now(&self) -> Instant;

    /// Wall-clock time, used to show when a request started.
    fn wall(&self) -> SystemTime;
}

/// The platform clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
///
/// ```rust
/// use reqdebug::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let before = clock.now();
/// clock.advance(Duration::from_millis(100));
/// assert_eq!(clock.now() - before, Duration::from_millis(100));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: SystemTime,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            origin: Instant::now(),
            wall_origin: SystemTime::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    fn offset(&self) -> MutexGuard<'_, Duration> {
        self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn advance(&self, by: Duration) {
        *self.offset() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset()
    }

    fn wall(&self) -> SystemTime {
        self.wall_origin + *self.offset()
    }
}
