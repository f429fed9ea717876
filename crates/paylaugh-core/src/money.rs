//! Fixed-point money
//!
//! Bills are accumulated in whole cents so that ten laughs at €0.30 are
//! exactly €3.00, however many increments it took to get there.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::{PaylaughError, PaylaughResult};

/// Currency symbol used when formatting amounts
pub const CURRENCY_SYMBOL: &str = "€";

/// Non-negative amount in cents
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[inline]
    pub const fn from_cents(cents: u64) -> Self {
        Money(cents)
    }

    /// Build from whole units and cents, e.g. `(24, 0)` for €24.00
    #[inline]
    pub const fn from_units(units: u64, cents: u64) -> Self {
        Money(units * 100 + cents)
    }

    #[inline]
    pub const fn cents(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Add `other`, never exceeding `ceiling`
    #[inline]
    pub fn clamped_add(self, other: Money, ceiling: Money) -> Money {
        self.saturating_add(other).min(ceiling)
    }

    /// Plain decimal representation without currency symbol, e.g. `3.00`
    pub fn to_decimal_string(self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }

    /// Parse a decimal amount such as `0.30`, `24`, `€3.5`
    pub fn parse(input: &str) -> PaylaughResult<Money> {
        let invalid = || PaylaughError::InvalidAmount(input.to_string());

        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix(CURRENCY_SYMBOL).unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };

        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Money)
            .ok_or_else(invalid)
    }
}

impl FromStr for Money {
    type Err = PaylaughError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({})", self.to_decimal_string())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CURRENCY_SYMBOL, self.to_decimal_string())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_increments_are_exact() {
        let price = Money::from_cents(30);
        let mut bill = Money::ZERO;
        for _ in 0..10 {
            bill = bill.saturating_add(price);
        }
        assert_eq!(bill, Money::from_units(3, 0));
        assert_eq!(bill.to_string(), "€3.00");
    }

    #[test]
    fn test_clamped_add() {
        let ceiling = Money::from_units(3, 0);
        let bill = Money::from_cents(290).clamped_add(Money::from_cents(30), ceiling);
        assert_eq!(bill, ceiling);
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!(Money::parse("0.30").unwrap(), Money::from_cents(30));
        assert_eq!(Money::parse("24").unwrap(), Money::from_units(24, 0));
        assert_eq!(Money::parse("€3.5").unwrap(), Money::from_cents(350));
        assert_eq!(Money::parse(".05").unwrap(), Money::from_cents(5));
        assert_eq!(" 1.25 ".parse::<Money>().unwrap(), Money::from_cents(125));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "€", "-1", "1.234", "abc", "1.x", "1,50", "."] {
            assert!(
                matches!(Money::parse(bad), Err(PaylaughError::InvalidAmount(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_formatting() {
        assert_eq!(Money::from_cents(5).to_string(), "€0.05");
        assert_eq!(format!("{:?}", Money::from_cents(2400)), "Money(24.00)");
    }

    proptest::proptest! {
        #[test]
        fn prop_clamped_add_never_exceeds_ceiling(
            bill in 0u64..100_000,
            price in 0u64..10_000,
            ceiling in 0u64..100_000,
        ) {
            let ceiling = Money::from_cents(ceiling);
            let bill = Money::from_cents(bill).min(ceiling);
            let next = bill.clamped_add(Money::from_cents(price), ceiling);
            proptest::prop_assert!(next <= ceiling);
            proptest::prop_assert!(next >= bill);
        }
    }
}
