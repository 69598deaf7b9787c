//! Money amount representation.
//!
//! Amounts are stored as integer minor units (cents) to avoid
//! floating-point drift in fee arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A money amount in integer minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    cents: u64,
}

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self { cents: 0 };

    /// Create an amount from minor units (cents).
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Create an amount from whole dollars.
    #[must_use]
    pub const fn from_dollars(dollars: u64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Get the amount in minor units (cents).
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.cents
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(&self, other: Self) -> Self {
        Self {
            cents: self.cents.saturating_add(other.cents),
        }
    }

    /// Saturating subtraction.
    #[must_use]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        Self {
            cents: self.cents.saturating_sub(other.cents),
        }
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.cents.checked_add(other.cents) {
            Some(cents) => Some(Self { cents }),
            None => None,
        }
    }

    /// Checked subtraction.
    #[must_use]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.cents.checked_sub(other.cents) {
            Some(cents) => Some(Self { cents }),
            None => None,
        }
    }

    /// The larger ("ceiling") half of the amount, paired with the remainder.
    ///
    /// Used for split payments: the deposit takes the ceiling of half so
    /// that deposit + final always equals the original amount.
    #[must_use]
    pub const fn split_half_up(&self) -> (Self, Self) {
        let deposit = self.cents.div_ceil(2);
        (
            Self { cents: deposit },
            Self {
                cents: self.cents - deposit,
            },
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            cents: self.cents + other.cents,
        }
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            cents: self.cents - other.cents,
        }
    }
}

impl From<u64> for Money {
    fn from(cents: u64) -> Self {
        Self::from_cents(cents)
    }
}
