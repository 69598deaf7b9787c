//! Catalog types shared across the marketplace core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Listing tier, driving both the credit posting cost and the money
/// platform fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Short shifts with fixed time slots.
    Slots,
    /// One-off missions.
    Missions,
    /// General tasks.
    Tasks,
    /// Longer-running projects.
    Projects,
    /// Open-ended opportunities.
    Chances,
}

impl Tier {
    /// All tiers, in ascending cost order.
    pub const ALL: [Self; 5] = [
        Self::Slots,
        Self::Missions,
        Self::Tasks,
        Self::Projects,
        Self::Chances,
    ];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slots => write!(f, "Slots"),
            Self::Missions => write!(f, "Missions"),
            Self::Tasks => write!(f, "Tasks"),
            Self::Projects => write!(f, "Projects"),
            Self::Chances => write!(f, "Chances"),
        }
    }
}

/// Paid visibility boost applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoostLevel {
    /// No boost.
    #[default]
    None,
    /// Boosted for 24 hours.
    Boost24h,
    /// Boosted for 72 hours.
    Boost72h,
    /// Featured placement for 7 days.
    Featured7d,
}

impl BoostLevel {
    /// Ranking weight for the documented sort order. Higher sorts first.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Boost24h => 1,
            Self::Boost72h => 2,
            Self::Featured7d => 3,
        }
    }
}

impl fmt::Display for BoostLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Boost24h => write!(f, "24h Boost"),
            Self::Boost72h => write!(f, "72h Boost"),
            Self::Featured7d => write!(f, "7 Day Featured"),
        }
    }
}

/// Subscription plan of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Standard plan; listing actions consume credits.
    #[default]
    Free,
    /// Elite plan; unlimited posting, never debited for listing costs.
    Elite,
}

impl Plan {
    /// Check if this plan posts without consuming credits.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Self::Elite)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Elite => write!(f, "elite"),
        }
    }
}

/// Kind of a listing post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    /// A gig listing priced by tier.
    Gig,
    /// An event listing priced by its event flags.
    Event,
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gig => write!(f, "gig"),
            Self::Event => write!(f, "event"),
        }
    }
}
