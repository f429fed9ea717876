//! Runtime clock

use paylaugh_core::{Clock, SessionTime};
use tokio::time::Instant;

/// Monotonic session clock starting at zero when created
///
/// Backed by the tokio clock, so it follows paused time in tests.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> SessionTime {
        let millis = self.epoch.elapsed().as_millis();
        SessionTime::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }
}
