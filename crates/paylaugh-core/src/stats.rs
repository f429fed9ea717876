//! Session statistics and laugh events

use serde::Serialize;

use crate::{LaughId, Money, SessionTime};

/// Aggregated billing state of one session
///
/// Created zeroed at session start and mutated only by the billing reducer.
/// `current_bill` is clamped per accepted laugh, so it is not always
/// `total_laughs * price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStats {
    pub total_laughs: u64,
    pub current_bill: Money,
    pub is_maxed: bool,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.total_laughs == 0 && self.current_bill.is_zero() && !self.is_maxed
    }
}

/// An accepted, billable laugh
///
/// Not retained by the session; it only lives long enough to drive the
/// celebration overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaughEvent {
    pub id: LaughId,
    pub timestamp: SessionTime,
    /// Bill after this laugh was applied
    pub bill_after: Money,
}
