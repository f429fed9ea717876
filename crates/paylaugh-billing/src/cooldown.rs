//! Cooldown gate between accepted laughs

use std::time::Duration;

use paylaugh_core::SessionTime;
use serde::Serialize;

/// Logical state of the cooldown gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArmState {
    /// Next laugh above threshold will be billed
    Armed,
    /// A laugh was billed recently; further laughs are ignored
    CoolingDown { remaining: Duration },
}

impl ArmState {
    pub fn is_armed(&self) -> bool {
        matches!(self, ArmState::Armed)
    }
}

/// Single mutable timestamp of the last accepted laugh
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    window: Duration,
    last_accepted: Option<SessionTime>,
}

impl Cooldown {
    /// New gate, initially armed
    pub fn new(window: Duration) -> Self {
        Cooldown {
            window,
            last_accepted: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_accepted(&self) -> Option<SessionTime> {
        self.last_accepted
    }

    /// State of the gate at `now`
    ///
    /// A `now` earlier than the last acceptance counts as zero elapsed time.
    pub fn state_at(&self, now: SessionTime) -> ArmState {
        match self.last_accepted {
            None => ArmState::Armed,
            Some(last) => {
                let elapsed = now.saturating_since(last);
                if elapsed >= self.window {
                    ArmState::Armed
                } else {
                    ArmState::CoolingDown {
                        remaining: self.window - elapsed,
                    }
                }
            }
        }
    }

    /// Record an accepted laugh at `now`
    pub(crate) fn fire(&mut self, now: SessionTime) {
        self.last_accepted = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_armed() {
        let gate = Cooldown::new(Duration::from_millis(1000));
        assert!(gate.state_at(SessionTime::ZERO).is_armed());
        assert_eq!(gate.last_accepted(), None);
    }

    #[test]
    fn test_cooling_down_until_window_elapses() {
        let mut gate = Cooldown::new(Duration::from_millis(1000));
        gate.fire(SessionTime::from_millis(10));

        assert_eq!(
            gate.state_at(SessionTime::from_millis(20)),
            ArmState::CoolingDown {
                remaining: Duration::from_millis(990)
            }
        );
        assert!(!gate.state_at(SessionTime::from_millis(1009)).is_armed());
        assert!(gate.state_at(SessionTime::from_millis(1010)).is_armed());
    }

    #[test]
    fn test_time_going_backwards_keeps_cooling() {
        let mut gate = Cooldown::new(Duration::from_millis(500));
        gate.fire(SessionTime::from_millis(1000));
        assert_eq!(
            gate.state_at(SessionTime::from_millis(200)),
            ArmState::CoolingDown {
                remaining: Duration::from_millis(500)
            }
        );
    }

    #[test]
    fn test_zero_window_is_always_armed() {
        let mut gate = Cooldown::new(Duration::ZERO);
        gate.fire(SessionTime::from_millis(5));
        assert!(gate.state_at(SessionTime::from_millis(5)).is_armed());
    }

    proptest::proptest! {
        #[test]
        fn prop_remaining_bounded_by_window(window in 0u64..10_000, fired in 0u64..1_000_000, now in 0u64..1_000_000) {
            let mut gate = Cooldown::new(Duration::from_millis(window));
            gate.fire(SessionTime::from_millis(fired));
            match gate.state_at(SessionTime::from_millis(now)) {
                ArmState::Armed => proptest::prop_assert!(now.saturating_sub(fired) >= window),
                ArmState::CoolingDown { remaining } => {
                    proptest::prop_assert!(remaining <= Duration::from_millis(window));
                    proptest::prop_assert!(!remaining.is_zero());
                }
            }
        }
    }
}
