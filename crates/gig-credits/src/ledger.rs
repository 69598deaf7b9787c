//! The credit ledger.
//!
//! Owns per-user balances and the append-only transaction log. Every
//! balance mutation appends a signed log entry, so summing a user's entries
//! always reproduces their current balance.
//!
//! The balance check and the write happen inside a single critical section:
//! two concurrent debits that would individually succeed cannot both pass
//! when their sum exceeds the balance.

use crate::credits::Credits;
use crate::entry::{LedgerAction, LedgerEntry};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use gig_core::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A user's credit balance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditAccount {
    /// Current balance.
    pub balance: Credits,
    /// When the balance last changed.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<UserId, CreditAccount>,
    entries: HashMap<UserId, Vec<LedgerEntry>>,
}

impl LedgerState {
    fn append(&mut self, user: &UserId, action: LedgerAction, amount: i64, description: String) {
        self.entries
            .entry(user.clone())
            .or_default()
            .push(LedgerEntry::new(user.clone(), action, amount, description));
    }
}

/// The credit ledger service.
#[derive(Debug, Clone, Default)]
pub struct CreditLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl CreditLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a user's balance.
    ///
    /// Returns `None` for a user whose account was never initialized;
    /// absent is uninitialized, not zero.
    pub async fn balance(&self, user: &UserId) -> Option<Credits> {
        let state = self.state.lock().await;
        state.accounts.get(user).map(|account| account.balance)
    }

    /// Get a user's account row.
    pub async fn account(&self, user: &UserId) -> Option<CreditAccount> {
        let state = self.state.lock().await;
        state.accounts.get(user).copied()
    }

    /// Initialize a user's account with an opening balance.
    ///
    /// Idempotent: an existing account is returned unchanged, and the
    /// `init` log entry is written only on first creation.
    pub async fn initialize(&self, user: &UserId, starting: Credits) -> CreditAccount {
        let mut state = self.state.lock().await;
        if let Some(account) = state.accounts.get(user) {
            return *account;
        }

        let account = CreditAccount {
            balance: starting,
            updated_at: Utc::now(),
        };
        state.accounts.insert(user.clone(), account);
        state.append(
            user,
            LedgerAction::Init,
            starting.as_delta(),
            "opening balance".to_string(),
        );

        info!(user = %user, balance = %starting, "credit account initialized");
        account
    }

    /// Debit a user's balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientCredits`] when the account does
    /// not exist (available = 0) or cannot cover the amount, and
    /// [`LedgerError::InvalidAmount`] for a zero amount. The balance is
    /// untouched on failure.
    pub async fn debit(
        &self,
        user: &UserId,
        amount: Credits,
        action: LedgerAction,
        description: impl Into<String>,
    ) -> Result<CreditAccount> {
        if amount.is_zero() {
            return Err(LedgerError::invalid_amount("debit amount must be positive"));
        }

        let mut state = self.state.lock().await;

        let available = state
            .accounts
            .get(user)
            .map_or(Credits::ZERO, |account| account.balance);
        let Some(remaining) = available.checked_sub(amount) else {
            return Err(LedgerError::insufficient(amount.amount(), available.amount()));
        };

        let account = CreditAccount {
            balance: remaining,
            updated_at: Utc::now(),
        };
        state.accounts.insert(user.clone(), account);
        state.append(user, action, -amount.as_delta(), description.into());

        debug!(
            user = %user,
            amount = %amount,
            action = %action,
            balance = %remaining,
            "credits debited"
        );
        Ok(account)
    }

    /// Credit a user's balance.
    ///
    /// For a never-initialized user this is equivalent to
    /// [`initialize`](Self::initialize) with the grant as the opening
    /// balance: one `init` entry is logged and the originating action is
    /// carried in the description only.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] for a zero amount.
    pub async fn credit(
        &self,
        user: &UserId,
        amount: Credits,
        action: LedgerAction,
        description: impl Into<String>,
    ) -> Result<CreditAccount> {
        if amount.is_zero() {
            return Err(LedgerError::invalid_amount(
                "credit amount must be positive",
            ));
        }

        let description = description.into();
        let mut state = self.state.lock().await;

        let account = if let Some(existing) = state.accounts.get(user) {
            let account = CreditAccount {
                balance: existing.balance.saturating_add(amount),
                updated_at: Utc::now(),
            };
            state.accounts.insert(user.clone(), account);
            state.append(user, action, amount.as_delta(), description);
            account
        } else {
            let account = CreditAccount {
                balance: amount,
                updated_at: Utc::now(),
            };
            state.accounts.insert(user.clone(), account);
            state.append(user, LedgerAction::Init, amount.as_delta(), description);
            account
        };

        debug!(
            user = %user,
            amount = %amount,
            action = %action,
            balance = %account.balance,
            "credits granted"
        );
        Ok(account)
    }

    /// List a user's log entries, newest first.
    pub async fn entries(&self, user: &UserId) -> Vec<LedgerEntry> {
        let state = self.state.lock().await;
        let mut entries = state.entries.get(user).cloned().unwrap_or_default();
        entries.reverse();
        entries
    }

    /// Debit the credit cost of posting a listing.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`debit`](Self::debit).
    pub async fn debit_for_listing(
        &self,
        user: &UserId,
        cost: Credits,
        is_event: bool,
        label: impl Into<String>,
    ) -> Result<CreditAccount> {
        let action = if is_event {
            LedgerAction::PostEvent
        } else {
            LedgerAction::PostListing
        };
        self.debit(user, cost, action, label).await
    }

    /// Debit the credit cost of applying to a post.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`debit`](Self::debit).
    pub async fn debit_for_application(
        &self,
        user: &UserId,
        cost: Credits,
        label: impl Into<String>,
    ) -> Result<CreditAccount> {
        self.debit(user, cost, LedgerAction::Apply, label).await
    }

    /// Credit a purchased pack.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`credit`](Self::credit).
    pub async fn credit_for_purchase(
        &self,
        user: &UserId,
        amount: Credits,
        label: impl Into<String>,
    ) -> Result<CreditAccount> {
        self.credit(user, amount, LedgerAction::Purchase, label)
            .await
    }
}
