//! Platform configuration.
//!
//! All category tables, pricing tables and the admin allow-list live in one
//! immutable [`PlatformConfig`], built once at process start and shared by
//! `Arc` into the components that need it. Nothing here is mutable after
//! construction.

use crate::money::Money;
use crate::types::{BoostLevel, Tier};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Money fee and duration attached to a boost level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostFee {
    /// Money fee charged when the boost is attached to a booking.
    pub fee: Money,
    /// Boost duration in hours; zero means no expiry window.
    pub hours: i64,
}

/// Pricing tables for listing credit costs and booking money fees.
///
/// Credit costs and money fees are two independent pricing dimensions: the
/// platform fee is charged in money on bookings, the listing cost is charged
/// in credits on posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Credit cost to post a gig, per tier.
    pub post_credit_costs: HashMap<Tier, u64>,
    /// Credit cost to post a non-NSFW event.
    pub event_credit_cost: u64,
    /// Credit cost to post an NSFW event.
    pub nsfw_event_credit_cost: u64,
    /// Credit cost of a boost, per level.
    pub boost_credit_costs: HashMap<BoostLevel, u64>,
    /// Money platform fee per tier.
    pub tier_fees: HashMap<Tier, Money>,
    /// Money fee and duration per boost level.
    pub boost_fees: HashMap<BoostLevel, BoostFee>,
}

impl PricingConfig {
    /// Credit cost a missing tier entry falls back to.
    pub const DEFAULT_POST_COST: u64 = 1;

    /// Credit cost to post a gig of the given tier.
    ///
    /// Falls back to [`Self::DEFAULT_POST_COST`] when the tier has no
    /// configured entry.
    #[must_use]
    pub fn post_cost(&self, tier: Tier) -> u64 {
        self.post_credit_costs
            .get(&tier)
            .copied()
            .unwrap_or(Self::DEFAULT_POST_COST)
    }

    /// Credit cost to post an event.
    #[must_use]
    pub const fn event_cost(&self, nsfw: bool) -> u64 {
        if nsfw {
            self.nsfw_event_credit_cost
        } else {
            self.event_credit_cost
        }
    }

    /// Credit cost of a boost. Falls back to 0 when unconfigured.
    #[must_use]
    pub fn boost_cost(&self, level: BoostLevel) -> u64 {
        self.boost_credit_costs.get(&level).copied().unwrap_or(0)
    }

    /// Money platform fee for a tier. Falls back to zero when unconfigured.
    #[must_use]
    pub fn tier_fee(&self, tier: Tier) -> Money {
        self.tier_fees.get(&tier).copied().unwrap_or(Money::ZERO)
    }

    /// Money fee and duration for a boost level.
    #[must_use]
    pub fn boost_fee(&self, level: BoostLevel) -> BoostFee {
        self.boost_fees
            .get(&level)
            .copied()
            .unwrap_or(BoostFee {
                fee: Money::ZERO,
                hours: 0,
            })
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            post_credit_costs: HashMap::from([
                (Tier::Slots, 1),
                (Tier::Missions, 2),
                (Tier::Tasks, 3),
                (Tier::Projects, 4),
                (Tier::Chances, 5),
            ]),
            event_credit_cost: 1,
            nsfw_event_credit_cost: 3,
            boost_credit_costs: HashMap::from([
                (BoostLevel::None, 0),
                (BoostLevel::Boost24h, 2),
                (BoostLevel::Boost72h, 4),
                (BoostLevel::Featured7d, 8),
            ]),
            tier_fees: HashMap::from([
                (Tier::Slots, Money::from_cents(50)),
                (Tier::Missions, Money::from_cents(100)),
                (Tier::Tasks, Money::from_cents(150)),
                (Tier::Projects, Money::from_cents(200)),
                (Tier::Chances, Money::from_cents(250)),
            ]),
            boost_fees: HashMap::from([
                (
                    BoostLevel::None,
                    BoostFee {
                        fee: Money::ZERO,
                        hours: 0,
                    },
                ),
                (
                    BoostLevel::Boost24h,
                    BoostFee {
                        fee: Money::from_cents(300),
                        hours: 24,
                    },
                ),
                (
                    BoostLevel::Boost72h,
                    BoostFee {
                        fee: Money::from_cents(700),
                        hours: 72,
                    },
                ),
                (
                    BoostLevel::Featured7d,
                    BoostFee {
                        fee: Money::from_cents(1500),
                        hours: 168,
                    },
                ),
            ]),
        }
    }
}

/// Immutable platform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Emails with admin rights (static allow-list).
    pub admin_emails: HashSet<String>,
    /// Categories that require an approved professional verification to
    /// post in.
    pub licensed_categories: HashSet<String>,
    /// The NSFW content category.
    pub nsfw_category: String,
    /// The adult club event category; events in it are forcibly NSFW.
    pub adult_event_category: String,
    /// Opening credit grant for lazily-created accounts.
    pub starting_credits: u64,
    /// Credit cost of applying to a post.
    pub application_cost: u64,
    /// Pricing tables.
    pub pricing: PricingConfig,
}

impl PlatformConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> PlatformConfigBuilder {
        PlatformConfigBuilder::default()
    }

    /// Check if a category requires a professional license.
    #[must_use]
    pub fn is_licensed_category(&self, category: &str) -> bool {
        self.licensed_categories.contains(category)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            admin_emails: HashSet::new(),
            licensed_categories: HashSet::from([
                "Skilled Trades".to_string(),
                "Healthcare".to_string(),
                "Legal Services".to_string(),
            ]),
            nsfw_category: "Adult".to_string(),
            adult_event_category: "Adult Club Event".to_string(),
            starting_credits: 3,
            application_cost: 1,
            pricing: PricingConfig::default(),
        }
    }
}

/// Builder for constructing [`PlatformConfig`] instances.
#[derive(Debug, Clone, Default)]
pub struct PlatformConfigBuilder {
    config: PlatformConfig,
}

impl PlatformConfigBuilder {
    /// Sets the admin email allow-list.
    #[must_use]
    pub fn admin_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.admin_emails = emails.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the licensed category set.
    #[must_use]
    pub fn licensed_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.licensed_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the opening credit grant.
    #[must_use]
    pub const fn starting_credits(mut self, credits: u64) -> Self {
        self.config.starting_credits = credits;
        self
    }

    /// Sets the credit cost of applying to a post.
    #[must_use]
    pub const fn application_cost(mut self, credits: u64) -> Self {
        self.config.application_cost = credits;
        self
    }

    /// Replaces the pricing tables.
    #[must_use]
    pub fn pricing(mut self, pricing: PricingConfig) -> Self {
        self.config.pricing = pricing;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> PlatformConfig {
        self.config
    }
}
