//! # gig-market
//!
//! Listings, applications and gating for the gigboard marketplace.
//!
//! This crate provides:
//!
//! - [`EligibilityGate`] — NSFW/licensed-category gating over verification
//!   records
//! - [`PriceBook`] — Pure credit-cost and money-fee calculation
//! - [`ListingBoard`] — Listing creation (gate → price → debit → insert),
//!   visibility filtering and applications

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod application;
pub mod eligibility;
pub mod error;
pub mod listing;
pub mod notify;
pub mod pricing;

pub use application::{Application, ApplicationStatus};
pub use eligibility::{
    EligibilityGate, ProfessionalVerification, ReviewStatus, VerificationRequest, VerificationStore,
};
pub use error::{MarketError, Result};
pub use listing::{ListingBoard, ListingInput, Post};
pub use notify::{NoopNotifier, Notifier, NotifyError};
pub use pricing::{can_afford, FeeBreakdown, ListingQuote, PriceBook};
