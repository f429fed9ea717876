//! Laugh meter - the billing reducer

use std::time::Duration;

use paylaugh_core::{
    BillingConfig, DetectionSample, LaughEvent, LaughId, Money, PaylaughResult, SessionStats,
    SessionTime,
};
use serde::Serialize;

use crate::{ArmState, Cooldown};

/// Why a sample was or was not billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// New billable laugh
    Accepted(LaughEvent),
    /// Above threshold, but inside the cooldown window
    CoolingDown { remaining: Duration },
    /// Happy probability did not exceed the threshold
    BelowThreshold,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }

    /// Whether the sample itself looked like a laugh, billed or not
    pub fn is_laughing(&self) -> bool {
        !matches!(self, Verdict::BelowThreshold)
    }

    pub fn laugh(&self) -> Option<LaughEvent> {
        match self {
            Verdict::Accepted(event) => Some(*event),
            _ => None,
        }
    }
}

/// Result of evaluating one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Statistics after the sample was applied
    pub stats: SessionStats,
    pub verdict: Verdict,
}

impl Evaluation {
    #[inline]
    pub fn laugh_accepted(&self) -> bool {
        self.verdict.is_accepted()
    }
}

/// Billing reducer state for one session
///
/// Owns the statistics and the cooldown timestamp exclusively. Calls to
/// [`LaughMeter::evaluate`] must be serialized in sample order.
#[derive(Debug, Clone)]
pub struct LaughMeter {
    config: BillingConfig,
    stats: SessionStats,
    cooldown: Cooldown,
    next_laugh: LaughId,
}

impl LaughMeter {
    /// Create a meter with the default comedy club pricing
    pub fn new() -> Self {
        Self::with_config(BillingConfig::default())
    }

    /// Create a meter with custom configuration
    pub fn with_config(config: BillingConfig) -> Self {
        LaughMeter {
            config,
            stats: SessionStats::new(),
            cooldown: Cooldown::new(config.cooldown),
            next_laugh: LaughId::FIRST,
        }
    }

    /// Create a meter, rejecting unusable configuration
    pub fn try_with_config(config: BillingConfig) -> PaylaughResult<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// ARMED / COOLING_DOWN at `now`
    pub fn arm_state(&self, now: SessionTime) -> ArmState {
        self.cooldown.state_at(now)
    }

    /// Decide whether `sample` is a new billable laugh and apply it
    ///
    /// Accepted iff the happy probability strictly exceeds the threshold and
    /// the cooldown has elapsed. Rejections leave the statistics untouched.
    pub fn evaluate(&mut self, sample: &DetectionSample, now: SessionTime) -> Evaluation {
        let verdict = if sample.happy_probability() > self.config.laugh_threshold {
            match self.cooldown.state_at(now) {
                ArmState::CoolingDown { remaining } => Verdict::CoolingDown { remaining },
                ArmState::Armed => Verdict::Accepted(self.accept(now)),
            }
        } else {
            Verdict::BelowThreshold
        };

        Evaluation {
            stats: self.stats,
            verdict,
        }
    }

    fn accept(&mut self, now: SessionTime) -> LaughEvent {
        self.cooldown.fire(now);

        let previous = self.stats.current_bill;
        self.stats.total_laughs += 1;
        self.stats.current_bill =
            previous.clamped_add(self.config.price_per_laugh, self.config.max_bill);
        self.stats.is_maxed = self.stats.current_bill >= self.config.max_bill;

        let event = LaughEvent {
            id: self.next_laugh,
            timestamp: now,
            bill_after: self.stats.current_bill,
        };
        self.next_laugh = self.next_laugh.next();

        if self.stats.is_maxed && previous < self.config.max_bill {
            tracing::info!(
                laughs = self.stats.total_laughs,
                bill = %self.stats.current_bill,
                "bill reached ceiling"
            );
        } else {
            tracing::debug!(
                laugh = %event.id,
                at = %now,
                bill = %self.stats.current_bill,
                "laugh billed"
            );
        }

        event
    }

    /// Amount still billable before the ceiling
    pub fn headroom(&self) -> Money {
        Money::from_cents(
            self.config
                .max_bill
                .cents()
                .saturating_sub(self.stats.current_bill.cents()),
        )
    }
}

impl Default for LaughMeter {
    fn default() -> Self {
        Self::new()
    }
}
