//! Follower notifications.
//!
//! Notifying followers of a new listing is best-effort by contract: a
//! failure is logged and never rolls back or fails the listing creation
//! that preceded it.

use gig_core::UserId;
use thiserror::Error;

use crate::listing::Post;

/// A notification delivery failure.
#[derive(Debug, Error)]
#[error("notification failed: {message}")]
pub struct NotifyError {
    /// Description of the failure.
    pub message: String,
}

impl NotifyError {
    /// Create a notification error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Delivers new-listing notifications to a poster's followers.
pub trait Notifier: Send + Sync {
    /// Notify the owner's followers about a new post.
    ///
    /// # Errors
    ///
    /// Returns an error when delivery fails; callers treat this as
    /// best-effort and must not propagate it.
    fn notify_followers(&self, owner: &UserId, post: &Post) -> Result<(), NotifyError>;
}

/// A notifier that delivers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_followers(&self, _owner: &UserId, _post: &Post) -> Result<(), NotifyError> {
        Ok(())
    }
}
