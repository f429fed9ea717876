//! Time primitives for PAYLAUGH sessions
//!
//! Session time is monotonic wall-clock milliseconds since the session epoch.
//! The reducer never reads a clock itself; callers pass `now` explicitly, and
//! the runtime obtains it from a [`Clock`].

use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

/// Session time - milliseconds since the session epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct SessionTime(pub u64);

impl SessionTime {
    pub const ZERO: SessionTime = SessionTime(0);
    pub const MAX: SessionTime = SessionTime(u64::MAX);

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        SessionTime(millis)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Time elapsed since `earlier`; zero if `earlier` is in the future
    #[inline]
    pub fn saturating_since(self, earlier: SessionTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        SessionTime(self.0.saturating_add(duration_millis(duration)))
    }
}

#[inline]
fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Add<Duration> for SessionTime {
    type Output = SessionTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<SessionTime> for SessionTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: SessionTime) -> Self::Output {
        self.saturating_since(rhs)
    }
}

impl std::fmt::Debug for SessionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({}ms)", self.0)
    }
}

impl std::fmt::Display for SessionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// Source of session time
/// INVARIANT: successive calls to `now` never go backwards
pub trait Clock: Send + Sync {
    fn now(&self) -> SessionTime;
}

/// Manually driven clock for tests and simulations
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(time: SessionTime) -> Self {
        ManualClock {
            millis: Arc::new(AtomicU64::new(time.0)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(duration_millis(by), Ordering::SeqCst);
    }

    /// Jump to a specific time. Only moves forward.
    pub fn set(&self, time: SessionTime) {
        self.millis.fetch_max(time.0, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SessionTime {
        SessionTime(self.millis.load(Ordering::SeqCst))
    }
}
