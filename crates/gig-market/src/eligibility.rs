//! Eligibility gating over verification records.
//!
//! Pure read-only derivations: whether a user may view NSFW content and
//! whether they may post in a licensed category. Records are written by the
//! external admin-review flow; this module only evaluates them, per check,
//! with no caching.

use chrono::{DateTime, Utc};
use gig_core::{PlatformConfig, PostKind, UserId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{MarketError, Result};

/// Review status of a verification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Approved by a reviewer.
    Approved,
    /// Rejected by a reviewer.
    Rejected,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// An age-verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// The requesting user.
    pub user: UserId,
    /// Review status.
    pub status: ReviewStatus,
    /// Whether the user confirmed being of age.
    pub age_confirmed: bool,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
}

/// A per-category professional verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalVerification {
    /// The requesting user.
    pub user: UserId,
    /// The exact category the license covers.
    pub category: String,
    /// Review status.
    pub status: ReviewStatus,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    age_requests: HashMap<UserId, Vec<VerificationRequest>>,
    professional: HashMap<UserId, Vec<ProfessionalVerification>>,
}

/// In-memory store of verification records.
///
/// Reads are the hot path; writes arrive only from the admin-review flow.
#[derive(Debug, Clone, Default)]
pub struct VerificationStore {
    state: Arc<RwLock<StoreState>>,
}

impl VerificationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an age-verification request with the given review outcome.
    pub fn record_age_verification(&self, user: &UserId, status: ReviewStatus, age_confirmed: bool) {
        let mut state = self.state.write();
        state
            .age_requests
            .entry(user.clone())
            .or_default()
            .push(VerificationRequest {
                user: user.clone(),
                status,
                age_confirmed,
                created_at: Utc::now(),
            });
    }

    /// Record a professional verification with the given review outcome.
    pub fn record_professional_verification(
        &self,
        user: &UserId,
        category: impl Into<String>,
        status: ReviewStatus,
    ) {
        let mut state = self.state.write();
        state
            .professional
            .entry(user.clone())
            .or_default()
            .push(ProfessionalVerification {
                user: user.clone(),
                category: category.into(),
                status,
                created_at: Utc::now(),
            });
    }

    /// A user's age-verification requests, in submission order.
    #[must_use]
    pub fn age_requests(&self, user: &UserId) -> Vec<VerificationRequest> {
        let state = self.state.read();
        state.age_requests.get(user).cloned().unwrap_or_default()
    }

    /// A user's professional verifications, in submission order.
    #[must_use]
    pub fn professional_verifications(&self, user: &UserId) -> Vec<ProfessionalVerification> {
        let state = self.state.read();
        state.professional.get(user).cloned().unwrap_or_default()
    }

    fn has_approved_age_request(&self, user: &UserId) -> bool {
        let state = self.state.read();
        state.age_requests.get(user).is_some_and(|requests| {
            requests
                .iter()
                .any(|request| request.status == ReviewStatus::Approved && request.age_confirmed)
        })
    }

    fn has_approved_license(&self, user: &UserId, category: &str) -> bool {
        let state = self.state.read();
        state.professional.get(user).is_some_and(|records| {
            records
                .iter()
                .any(|record| record.status == ReviewStatus::Approved && record.category == category)
        })
    }
}

/// Derives a user's permission to view or post gated content.
#[derive(Debug, Clone)]
pub struct EligibilityGate {
    store: VerificationStore,
    config: Arc<PlatformConfig>,
}

impl EligibilityGate {
    /// Create a gate over the given store and configuration.
    #[must_use]
    pub fn new(store: VerificationStore, config: Arc<PlatformConfig>) -> Self {
        Self { store, config }
    }

    /// True iff any approved, age-confirmed verification request exists.
    #[must_use]
    pub fn is_age_verified(&self, user: &UserId) -> bool {
        self.store.has_approved_age_request(user)
    }

    /// True iff the category is licensed and the user holds an approved
    /// professional verification for exactly that category.
    #[must_use]
    pub fn is_category_licensed(&self, user: &UserId, category: &str) -> bool {
        self.config.is_licensed_category(category) && self.store.has_approved_license(user, category)
    }

    /// Whether the user may view NSFW content.
    #[must_use]
    pub fn can_view_nsfw(&self, user: &UserId) -> bool {
        self.is_age_verified(user)
    }

    /// Check whether the user may post in the category.
    ///
    /// Licensed categories require an approved professional verification
    /// for non-event posts; the denial carries the category so the caller
    /// can route the user to the verification flow.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::LicenseRequired`] when the category requires
    /// a license the user does not hold.
    pub fn can_post_in_category(&self, user: &UserId, category: &str, is_event: bool) -> Result<()> {
        if is_event {
            return Ok(());
        }
        if self.config.is_licensed_category(category) && !self.store.has_approved_license(user, category)
        {
            return Err(MarketError::LicenseRequired {
                category: category.to_string(),
            });
        }
        Ok(())
    }

    /// Whether content in this category (or explicitly flagged NSFW) sits
    /// behind the age gate.
    #[must_use]
    pub fn requires_age_gate(&self, category: &str, explicit_nsfw: bool) -> bool {
        explicit_nsfw
            || category == self.config.nsfw_category
            || category == self.config.adult_event_category
    }

    /// Normalize the NSFW flag for a post at creation time.
    ///
    /// Posts in the NSFW category, and events in the adult-club-event
    /// category, are forcibly NSFW regardless of the caller-supplied flag.
    #[must_use]
    pub fn normalize_nsfw(&self, category: &str, kind: PostKind, requested: bool) -> bool {
        requested
            || category == self.config.nsfw_category
            || (kind == PostKind::Event && category == self.config.adult_event_category)
    }
}
