//! Error types for gig-market.

use gig_core::AuthzError;
use gig_credits::LedgerError;
use thiserror::Error;

/// Result type alias for market operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors that can occur in listing and application operations.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Malformed input.
    #[error("validation failed: {field}")]
    Validation {
        /// The offending field.
        field: String,
    },

    /// The category requires an approved professional verification.
    #[error("posting in {category} requires an approved professional verification")]
    LicenseRequired {
        /// The licensed category, so the caller can route the user to the
        /// verification flow.
        category: String,
    },

    /// Post not found.
    #[error("post not found: {id}")]
    PostNotFound {
        /// The missing post ID.
        id: String,
    },

    /// Application not found.
    #[error("application not found: {id}")]
    ApplicationNotFound {
        /// The missing application ID.
        id: String,
    },

    /// The applicant already applied to this post.
    #[error("already applied to post {post}")]
    AlreadyApplied {
        /// The post applied to.
        post: String,
    },

    /// A post owner cannot apply to their own post.
    #[error("cannot apply to your own post")]
    OwnPost,

    /// The application was already accepted or rejected.
    #[error("application already decided: {status}")]
    AlreadyDecided {
        /// The terminal status it holds.
        status: String,
    },

    /// Credit ledger failure (including insufficient credits).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Authentication/authorization failure.
    #[error(transparent)]
    Authz(#[from] AuthzError),
}

impl MarketError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_required_carries_category() {
        let err = MarketError::LicenseRequired {
            category: "Skilled Trades".to_string(),
        };
        assert!(err.to_string().contains("Skilled Trades"));
    }

    #[test]
    fn test_ledger_error_is_transparent() {
        let err = MarketError::from(LedgerError::insufficient(8, 3));
        assert!(err.to_string().contains("required 8"));
    }
}
