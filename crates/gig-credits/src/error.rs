//! Error types for ledger operations.

use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during credit ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The balance cannot cover the requested debit.
    #[error("insufficient credits: required {required}, available {available}")]
    InsufficientCredits {
        /// Credits the operation needs.
        required: u64,
        /// Credits currently available (0 for an uninitialized account).
        available: u64,
    },

    /// The account has never been initialized.
    #[error("credit account not found for user {user}")]
    AccountNotFound {
        /// The user without an account.
        user: String,
    },

    /// A zero or otherwise invalid amount was supplied.
    #[error("invalid amount: {message}")]
    InvalidAmount {
        /// Description of the amount error.
        message: String,
    },
}

impl LedgerError {
    /// Create an insufficient-credits error.
    #[must_use]
    pub const fn insufficient(required: u64, available: u64) -> Self {
        Self::InsufficientCredits {
            required,
            available,
        }
    }

    /// Create an invalid-amount error.
    #[must_use]
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }
}
