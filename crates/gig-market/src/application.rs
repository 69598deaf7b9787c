//! Applications from talent to posts.

use chrono::{DateTime, Utc};
use gig_core::{ApplicationId, PostId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting the post owner's response.
    #[default]
    Pending,
    /// Accepted by the post owner.
    Accepted,
    /// Rejected by the post owner.
    Rejected,
}

impl ApplicationStatus {
    /// Check if the application has been decided.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// An application linking a post and an applicant.
///
/// Unique per (post, applicant); terminal once accepted or rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    /// Unique application ID.
    pub id: ApplicationId,
    /// The post applied to.
    pub post: PostId,
    /// The applying user.
    pub applicant: UserId,
    /// Current status.
    pub status: ApplicationStatus,
    /// When the application was submitted.
    pub created_at: DateTime<Utc>,
    /// When the owner decided, if they have.
    pub decided_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Create a pending application.
    #[must_use]
    pub fn new(post: PostId, applicant: UserId) -> Self {
        Self {
            id: ApplicationId::new(),
            post,
            applicant,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
        }
    }
}
