//! # gig-core
//!
//! Shared primitives for the gigboard marketplace transactional core.
//!
//! This crate provides:
//!
//! - [`Money`] — Integer minor-unit money amounts
//! - [`UserId`], [`PostId`], [`BookingId`], [`ApplicationId`] — Entity IDs
//! - [`Tier`], [`BoostLevel`], [`Plan`], [`PostKind`] — Catalog types
//! - [`PlatformConfig`] — Immutable platform configuration
//! - [`AuthorizationPolicy`] — Injectable admin-rights seam

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authz;
pub mod config;
pub mod ids;
pub mod money;
pub mod types;

pub use authz::{Actor, AuthorizationPolicy, AuthzError, Identity, StaticAllowList};
pub use config::{BoostFee, PlatformConfig, PlatformConfigBuilder, PricingConfig};
pub use ids::{ApplicationId, BookingId, PostId, UserId};
pub use money::Money;
pub use types::{BoostLevel, Plan, PostKind, Tier};
