//! Billing configuration and protocol constants

use std::time::Duration;

use serde::Serialize;

use crate::{Money, PaylaughError, PaylaughResult};

/// Price charged per accepted laugh (€0.30)
pub const PRICE_PER_LAUGH: Money = Money::from_cents(30);

/// Bill ceiling (€24.00) - the "season ticket"
pub const MAX_BILL: Money = Money::from_units(24, 0);

/// Happy probability a sample must exceed to count as a laugh
pub const LAUGH_THRESHOLD: f32 = 0.85;

/// Minimum time between two billed laughs
pub const COOLDOWN_MS: u64 = 2000;

/// Billing reducer configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BillingConfig {
    /// Amount added to the bill per accepted laugh
    pub price_per_laugh: Money,
    /// Ceiling the bill never exceeds
    pub max_bill: Money,
    /// Strict lower bound on happy probability, in [0, 1]
    pub laugh_threshold: f32,
    /// Minimum spacing between accepted laughs
    pub cooldown: Duration,
}

impl Default for BillingConfig {
    fn default() -> Self {
        BillingConfig {
            price_per_laugh: PRICE_PER_LAUGH,
            max_bill: MAX_BILL,
            laugh_threshold: LAUGH_THRESHOLD,
            cooldown: Duration::from_millis(COOLDOWN_MS),
        }
    }
}

impl BillingConfig {
    /// Short session with a low ceiling, used for demonstrations
    pub fn short_show() -> Self {
        BillingConfig {
            max_bill: Money::from_units(3, 0),
            cooldown: Duration::from_millis(1000),
            ..Default::default()
        }
    }

    /// Number of accepted laughs after which the bill is maxed
    pub fn laughs_to_max(&self) -> u64 {
        if self.price_per_laugh.is_zero() {
            return u64::MAX;
        }
        self.max_bill.cents().div_ceil(self.price_per_laugh.cents())
    }

    /// Threshold as a rounded percentage ("Sensitivity: 85%")
    pub fn sensitivity_percent(&self) -> u8 {
        (self.laugh_threshold.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> PaylaughResult<()> {
        if self.price_per_laugh.is_zero() {
            return Err(PaylaughError::InvalidConfig(
                "price per laugh must be positive".into(),
            ));
        }
        if self.max_bill.is_zero() {
            return Err(PaylaughError::InvalidConfig(
                "bill ceiling must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.laugh_threshold) {
            return Err(PaylaughError::InvalidConfig(format!(
                "laugh threshold {} outside [0, 1]",
                self.laugh_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BillingConfig::default();
        assert_eq!(config.price_per_laugh.to_string(), "€0.30");
        assert_eq!(config.max_bill.to_string(), "€24.00");
        assert_eq!(config.sensitivity_percent(), 85);
        assert_eq!(config.laughs_to_max(), 80);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_laughs_to_max_rounds_up() {
        let config = BillingConfig {
            price_per_laugh: Money::from_cents(70),
            max_bill: Money::from_units(3, 0),
            ..Default::default()
        };
        assert_eq!(config.laughs_to_max(), 5);
        assert_eq!(BillingConfig::short_show().laughs_to_max(), 10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let nan = BillingConfig {
            laugh_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let too_high = BillingConfig {
            laugh_threshold: 1.5,
            ..Default::default()
        };
        assert!(too_high.validate().is_err());

        let free = BillingConfig {
            price_per_laugh: Money::ZERO,
            ..Default::default()
        };
        assert!(free.validate().is_err());

        let no_ceiling = BillingConfig {
            max_bill: Money::ZERO,
            ..Default::default()
        };
        assert!(no_ceiling.validate().is_err());
    }
}
