//! Error types for gig-booking.

use gig_core::AuthzError;
use thiserror::Error;

use crate::provider::ProviderError;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Errors that can occur in booking and escrow operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Booking not found.
    #[error("booking not found: {id}")]
    NotFound {
        /// The missing booking ID.
        id: String,
    },

    /// The action is not allowed from the booking's current state.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// The current state.
        from: String,
        /// The attempted target state.
        to: String,
    },

    /// Malformed input.
    #[error("validation failed: {field}")]
    Validation {
        /// The offending field.
        field: String,
    },

    /// The payment provider call failed or returned an unexpected status.
    #[error("payment provider error: {message}")]
    Provider {
        /// Description of the provider failure.
        message: String,
    },

    /// Authentication/authorization failure.
    #[error(transparent)]
    Authz(#[from] AuthzError),
}

impl BookingError {
    /// Create an invalid-transition error.
    #[must_use]
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }
}

impl From<ProviderError> for BookingError {
    fn from(error: ProviderError) -> Self {
        Self::Provider {
            message: error.to_string(),
        }
    }
}
