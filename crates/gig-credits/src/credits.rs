//! Credit amount representation.
//!
//! Credits are the platform-internal currency consumed to post, apply and
//! boost listings. Whole units only; balances never go negative.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// An amount of platform credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Credits(u64);

impl Credits {
    /// Zero credits.
    pub const ZERO: Self = Self(0);

    /// Create an amount of credits.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Get the raw amount.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Checked subtraction; `None` when the amount would go negative.
    #[must_use]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(amount) => Some(Self(amount)),
            None => None,
        }
    }

    /// The amount as a signed ledger delta.
    #[must_use]
    pub const fn as_delta(&self) -> i64 {
        self.0 as i64
    }
}

impl Default for Credits {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1 {
            write!(f, "1 credit")
        } else {
            write!(f, "{} credits", self.0)
        }
    }
}

impl Add for Credits {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Credits {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl From<u64> for Credits {
    fn from(amount: u64) -> Self {
        Self::new(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert!(Credits::ZERO.is_zero());
        assert_eq!(Credits::ZERO.amount(), 0);
    }

    #[test]
    fn test_checked_sub_underflow() {
        assert!(Credits::new(5).checked_sub(Credits::new(10)).is_none());
        assert_eq!(
            Credits::new(10).checked_sub(Credits::new(6)),
            Some(Credits::new(4))
        );
    }

    #[test]
    fn test_saturating_add() {
        let max = Credits::new(u64::MAX);
        assert_eq!(max.saturating_add(Credits::new(1)), max);
    }

    #[test]
    fn test_display() {
        assert_eq!(Credits::new(1).to_string(), "1 credit");
        assert_eq!(Credits::new(8).to_string(), "8 credits");
    }

    #[test]
    fn test_as_delta() {
        assert_eq!(Credits::new(5).as_delta(), 5);
    }

    #[test]
    fn test_ordering() {
        assert!(Credits::new(3) < Credits::new(8));
    }

    #[test]
    fn test_serialization() {
        let credits = Credits::new(12);
        let json = serde_json::to_string(&credits).expect("serialize");
        let parsed: Credits = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(credits, parsed);
    }
}
