//! Listing cost calculation.
//!
//! Two independent pricing dimensions: the credit cost of posting (charged
//! against the poster's credit balance) and the money fees attached to a
//! booking (charged in minor units through the payment provider). All
//! lookups are pure reads over the immutable pricing tables.

use chrono::{DateTime, Duration, Utc};
use gig_core::{BoostLevel, Money, Plan, PlatformConfig, PostKind, Tier};
use gig_credits::Credits;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Money fee breakdown for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Platform fee for the tier.
    pub tier_fee: Money,
    /// Fee for the attached boost.
    pub boost_fee: Money,
    /// `base_pay + tier_fee + boost_fee`.
    pub total_amount: Money,
}

/// Combined quote for a listing: credit cost plus money fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuote {
    /// Credits the listing will debit.
    pub credit_cost: Credits,
    /// Money fees a booking through the listing will carry.
    pub fees: FeeBreakdown,
}

/// Check whether a plan and balance can cover a credit cost.
///
/// The elite plan has unlimited posting and always affords.
#[must_use]
pub fn can_afford(plan: Plan, balance: Credits, cost: Credits) -> bool {
    plan.is_unlimited() || balance >= cost
}

/// Pure cost/fee calculator over the platform pricing tables.
#[derive(Debug, Clone)]
pub struct PriceBook {
    config: Arc<PlatformConfig>,
}

impl PriceBook {
    /// Create a price book over the given configuration.
    #[must_use]
    pub fn new(config: Arc<PlatformConfig>) -> Self {
        Self { config }
    }

    /// Credit cost of posting a gig of the given tier.
    #[must_use]
    pub fn post_cost(&self, tier: Tier) -> Credits {
        Credits::new(self.config.pricing.post_cost(tier))
    }

    /// Credit cost of posting an event.
    #[must_use]
    pub fn event_cost(&self, nsfw: bool) -> Credits {
        Credits::new(self.config.pricing.event_cost(nsfw))
    }

    /// Credit cost of a boost level.
    #[must_use]
    pub fn boost_cost(&self, level: BoostLevel) -> Credits {
        Credits::new(self.config.pricing.boost_cost(level))
    }

    /// Total credit cost of a listing: base posting cost plus boost.
    #[must_use]
    pub fn total_credit_cost(
        &self,
        kind: PostKind,
        nsfw: bool,
        tier: Tier,
        boost: BoostLevel,
    ) -> Credits {
        let base = match kind {
            PostKind::Event => self.event_cost(nsfw),
            PostKind::Gig => self.post_cost(tier),
        };
        base.saturating_add(self.boost_cost(boost))
    }

    /// Money fee breakdown for a booking.
    #[must_use]
    pub fn money_total(&self, base_pay: Money, tier: Tier, boost: BoostLevel) -> FeeBreakdown {
        let tier_fee = self.config.pricing.tier_fee(tier);
        let boost_fee = self.config.pricing.boost_fee(boost).fee;
        FeeBreakdown {
            tier_fee,
            boost_fee,
            total_amount: base_pay.saturating_add(tier_fee).saturating_add(boost_fee),
        }
    }

    /// Quote a listing: its credit cost and the money fees a booking
    /// through it would carry.
    #[must_use]
    pub fn quote(
        &self,
        kind: PostKind,
        nsfw: bool,
        tier: Tier,
        boost: BoostLevel,
        base_pay: Money,
    ) -> ListingQuote {
        ListingQuote {
            credit_cost: self.total_credit_cost(kind, nsfw, tier, boost),
            fees: self.money_total(base_pay, tier, boost),
        }
    }

    /// When a boost applied now would expire; `None` for zero-duration
    /// boosts.
    #[must_use]
    pub fn boost_expiry(&self, level: BoostLevel, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let hours = self.config.pricing.boost_fee(level).hours;
        if hours == 0 {
            None
        } else {
            Some(now + Duration::hours(hours))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn price_book() -> PriceBook {
        PriceBook::new(Arc::new(PlatformConfig::default()))
    }

    #[test_case(Tier::Slots, 1; "slots")]
    #[test_case(Tier::Missions, 2; "missions")]
    #[test_case(Tier::Tasks, 3; "tasks")]
    #[test_case(Tier::Projects, 4; "projects")]
    #[test_case(Tier::Chances, 5; "chances")]
    fn post_cost_table(tier: Tier, expected: u64) {
        assert_eq!(price_book().post_cost(tier), Credits::new(expected));
    }

    #[test_case(BoostLevel::None, 0; "none")]
    #[test_case(BoostLevel::Boost24h, 2; "boost 24h")]
    #[test_case(BoostLevel::Boost72h, 4; "boost 72h")]
    #[test_case(BoostLevel::Featured7d, 8; "featured 7d")]
    fn boost_cost_table(level: BoostLevel, expected: u64) {
        assert_eq!(price_book().boost_cost(level), Credits::new(expected));
    }

    #[test]
    fn event_costs() {
        let book = price_book();
        assert_eq!(book.event_cost(false), Credits::new(1));
        assert_eq!(book.event_cost(true), Credits::new(3));
    }

    #[test]
    fn total_credit_cost_gig_with_boost() {
        // Projects (4) + 72h Boost (4) == 8.
        let cost = price_book().total_credit_cost(
            PostKind::Gig,
            false,
            Tier::Projects,
            BoostLevel::Boost72h,
        );
        assert_eq!(cost, Credits::new(8));
    }

    #[test]
    fn total_credit_cost_nsfw_event() {
        let cost = price_book().total_credit_cost(
            PostKind::Event,
            true,
            Tier::Slots,
            BoostLevel::Boost24h,
        );
        assert_eq!(cost, Credits::new(5));
    }

    #[test]
    fn money_total_projects_no_boost() {
        let fees = price_book().money_total(Money::from_cents(10_000), Tier::Projects, BoostLevel::None);
        assert_eq!(fees.tier_fee, Money::from_cents(200));
        assert_eq!(fees.boost_fee, Money::ZERO);
        assert_eq!(fees.total_amount, Money::from_cents(10_200));
    }

    #[test]
    fn money_total_with_boost() {
        let fees = price_book().money_total(
            Money::from_cents(5_000),
            Tier::Missions,
            BoostLevel::Featured7d,
        );
        assert_eq!(fees.tier_fee, Money::from_cents(100));
        assert_eq!(fees.boost_fee, Money::from_cents(1_500));
        assert_eq!(fees.total_amount, Money::from_cents(6_600));
    }

    #[test]
    fn boost_expiry_none_for_zero_duration() {
        let now = Utc::now();
        assert!(price_book().boost_expiry(BoostLevel::None, now).is_none());
    }

    #[test]
    fn boost_expiry_hours() {
        let now = Utc::now();
        let book = price_book();
        assert_eq!(
            book.boost_expiry(BoostLevel::Boost24h, now),
            Some(now + Duration::hours(24))
        );
        assert_eq!(
            book.boost_expiry(BoostLevel::Featured7d, now),
            Some(now + Duration::hours(168))
        );
    }

    #[test]
    fn quote_combines_credits_and_fees() {
        let quote = price_book().quote(
            PostKind::Gig,
            false,
            Tier::Projects,
            BoostLevel::Boost72h,
            Money::from_cents(10_000),
        );
        assert_eq!(quote.credit_cost, Credits::new(8));
        assert_eq!(quote.fees.tier_fee, Money::from_cents(200));
        assert_eq!(quote.fees.boost_fee, Money::from_cents(700));
        assert_eq!(quote.fees.total_amount, Money::from_cents(10_900));
    }

    #[test]
    fn can_afford_elite_is_unlimited() {
        assert!(can_afford(Plan::Elite, Credits::ZERO, Credits::new(100)));
    }

    #[test]
    fn can_afford_free_checks_balance() {
        assert!(can_afford(Plan::Free, Credits::new(8), Credits::new(8)));
        assert!(!can_afford(Plan::Free, Credits::new(7), Credits::new(8)));
    }
}
