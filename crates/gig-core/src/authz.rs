//! Authentication and authorization seam.
//!
//! Identity resolution is delegated to an external provider; this module
//! only models the authenticated result ([`Actor`]) and the authorization
//! policy used for admin checks. The policy is a trait so the static email
//! allow-list can be swapped for a role-based check without touching call
//! sites.

use crate::ids::UserId;
use crate::types::Plan;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Authentication/authorization errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    /// No identity was presented.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The identity lacks rights over the resource.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Why the action was denied.
        reason: String,
    },
}

impl AuthzError {
    /// Create a forbidden error.
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }
}

/// What the external identity provider yields for a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque authenticated user ID.
    pub user: UserId,
    /// Verified email address.
    pub email: String,
    /// Subscription plan.
    pub plan: Plan,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    identity: Identity,
}

impl Actor {
    /// Authenticate an optional identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Unauthenticated`] when no identity is present.
    pub fn authenticate(identity: Option<Identity>) -> Result<Self, AuthzError> {
        identity
            .map(|identity| Self { identity })
            .ok_or(AuthzError::Unauthenticated)
    }

    /// The authenticated user ID.
    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.identity.user
    }

    /// The authenticated email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.identity.email
    }

    /// The caller's subscription plan.
    #[must_use]
    pub const fn plan(&self) -> Plan {
        self.identity.plan
    }
}

/// Authorization policy for admin checks.
pub trait AuthorizationPolicy: Send + Sync {
    /// Check if the actor holds admin rights.
    fn is_admin(&self, actor: &Actor) -> bool;

    /// Check if the actor is the given user or an admin.
    fn is_owner_or_admin(&self, actor: &Actor, owner: &UserId) -> bool {
        actor.user() == owner || self.is_admin(actor)
    }
}

/// Admin policy backed by a static email allow-list.
#[derive(Debug, Clone, Default)]
pub struct StaticAllowList {
    emails: HashSet<String>,
}

impl StaticAllowList {
    /// Create an allow-list from a set of admin emails.
    #[must_use]
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an allow-list from the platform configuration.
    #[must_use]
    pub fn from_config(config: &crate::config::PlatformConfig) -> Self {
        Self {
            emails: config.admin_emails.clone(),
        }
    }
}

impl AuthorizationPolicy for StaticAllowList {
    fn is_admin(&self, actor: &Actor) -> bool {
        self.emails.contains(actor.email())
    }
}
