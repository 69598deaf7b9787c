//! Append-only credit log entries.

use chrono::{DateTime, Utc};
use gig_core::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a ledger entry was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAction {
    /// Opening grant when an account is first created.
    Init,
    /// Credit pack purchase.
    Purchase,
    /// Posting a gig listing.
    PostListing,
    /// Posting an event listing.
    PostEvent,
    /// Attaching a boost to a listing.
    Boost,
    /// Applying to a post.
    Apply,
    /// Refund issued by support.
    Refund,
    /// Manual adjustment by an admin.
    Adjustment,
}

impl fmt::Display for LedgerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Purchase => write!(f, "purchase"),
            Self::PostListing => write!(f, "post_listing"),
            Self::PostEvent => write!(f, "post_event"),
            Self::Boost => write!(f, "boost"),
            Self::Apply => write!(f, "apply"),
            Self::Refund => write!(f, "refund"),
            Self::Adjustment => write!(f, "adjustment"),
        }
    }
}

/// One append-only ledger entry.
///
/// `amount` is signed: debits are recorded negative, credits positive, so
/// that the sum of a user's entries always equals their current balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// The user whose balance the entry applies to.
    pub user: UserId,
    /// What the entry was recorded for.
    pub action: LedgerAction,
    /// Signed credit delta.
    pub amount: i64,
    /// Human-readable description.
    pub description: String,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create an entry recorded now.
    #[must_use]
    pub fn new(
        user: UserId,
        action: LedgerAction,
        amount: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user,
            action,
            amount,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}
