//! The booking service.
//!
//! Owns the booking store and applies lifecycle transitions with
//! authorization checks. Every transition is validated and written under
//! one lock acquisition; derived statuses are recomputed from post-write
//! installment values, never from a pre-fetch.

use gig_core::{Actor, AuthorizationPolicy, AuthzError, BookingId, PlatformConfig, UserId};
use gig_market::PriceBook;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::booking::{Booking, BookingInput, BookingStatus, Installment};
use crate::error::{BookingError, Result};

/// The booking service.
#[derive(Clone)]
pub struct BookingService {
    prices: PriceBook,
    authz: Arc<dyn AuthorizationPolicy>,
    store: Arc<Mutex<HashMap<BookingId, Booking>>>,
}

impl BookingService {
    /// Create a booking service.
    #[must_use]
    pub fn new(config: Arc<PlatformConfig>, authz: Arc<dyn AuthorizationPolicy>) -> Self {
        Self {
            prices: PriceBook::new(config),
            authz,
            store: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a booking in `pending_payment`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for missing targets or a zero
    /// base pay.
    pub async fn create_booking(&self, actor: &Actor, input: BookingInput) -> Result<Booking> {
        if input.post.is_none() && input.worker_slug.is_none() {
            return Err(BookingError::validation("target"));
        }
        if input.base_pay.is_zero() {
            return Err(BookingError::validation("base_pay"));
        }

        let fees = self
            .prices
            .money_total(input.base_pay, input.tier, input.boost);
        let booking = Booking::new(actor.user().clone(), input, fees);

        {
            let mut store = self.store.lock().await;
            store.insert(booking.id.clone(), booking.clone());
        }

        info!(
            booking = %booking.id,
            buyer = %booking.buyer,
            structure = %booking.payment_structure,
            total = %booking.total_amount,
            "booking created"
        );
        Ok(booking)
    }

    /// Get a booking. Buyer or admin only.
    ///
    /// # Errors
    ///
    /// Returns not-found or forbidden errors.
    pub async fn get(&self, actor: &Actor, id: &BookingId) -> Result<Booking> {
        let store = self.store.lock().await;
        let booking = store
            .get(id)
            .ok_or_else(|| BookingError::NotFound { id: id.to_string() })?;
        self.ensure_buyer_or_admin(actor, &booking.buyer)?;
        Ok(booking.clone())
    }

    /// The actor's own bookings, newest first.
    pub async fn bookings_for_buyer(&self, actor: &Actor) -> Vec<Booking> {
        let store = self.store.lock().await;
        let mut bookings: Vec<Booking> = store
            .values()
            .filter(|booking| booking.buyer == *actor.user())
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }

    /// Buyer-submitted payment (full payment, or one installment of a
    /// split).
    ///
    /// # Errors
    ///
    /// Returns not-found, forbidden, validation or invalid-transition
    /// errors.
    pub async fn mark_paid(
        &self,
        actor: &Actor,
        id: &BookingId,
        installment: Option<Installment>,
        session_id: Option<String>,
    ) -> Result<Booking> {
        let booking = self
            .mutate_authorized(actor, id, |booking| {
                booking.mark_paid(installment, session_id)
            })
            .await?;
        info!(booking = %id, status = %booking.status, "payment submitted");
        Ok(booking)
    }

    /// Admin confirmation of payment (full payment, or one installment of
    /// a split).
    ///
    /// # Errors
    ///
    /// Returns not-found, forbidden, validation or invalid-transition
    /// errors.
    pub async fn confirm_payment(
        &self,
        actor: &Actor,
        id: &BookingId,
        installment: Option<Installment>,
    ) -> Result<Booking> {
        if !self.authz.is_admin(actor) {
            return Err(AuthzError::forbidden("payment confirmation is admin-only").into());
        }
        let booking = self
            .mutate(id, |booking| booking.confirm_payment(installment))
            .await?;
        info!(booking = %id, status = %booking.status, "payment confirmed");
        Ok(booking)
    }

    /// Admin override of the booking status. Refused on terminal bookings.
    ///
    /// # Errors
    ///
    /// Returns not-found, forbidden or invalid-transition errors.
    pub async fn set_status(
        &self,
        actor: &Actor,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<Booking> {
        if !self.authz.is_admin(actor) {
            return Err(AuthzError::forbidden("status override is admin-only").into());
        }
        let booking = self
            .mutate(id, |booking| {
                if booking.status.is_terminal() {
                    return Err(BookingError::invalid_transition(
                        booking.status.to_string(),
                        status.to_string(),
                    ));
                }
                booking.status = status;
                booking.updated_at = chrono::Utc::now();
                Ok(())
            })
            .await?;
        info!(booking = %id, status = %booking.status, "booking status overridden");
        Ok(booking)
    }

    /// Cancel a booking. Buyer or admin, from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns not-found, forbidden or invalid-transition errors.
    pub async fn cancel(&self, actor: &Actor, id: &BookingId) -> Result<Booking> {
        let booking = self
            .mutate_authorized(actor, id, Booking::cancel)
            .await?;
        info!(booking = %id, "booking cancelled");
        Ok(booking)
    }

    fn ensure_buyer_or_admin(&self, actor: &Actor, buyer: &UserId) -> Result<()> {
        if self.authz.is_owner_or_admin(actor, buyer) {
            Ok(())
        } else {
            Err(AuthzError::forbidden("not the booking buyer").into())
        }
    }

    /// Apply a mutation to a booking under the store lock.
    pub(crate) async fn mutate<F>(&self, id: &BookingId, mutation: F) -> Result<Booking>
    where
        F: FnOnce(&mut Booking) -> Result<()>,
    {
        let mut store = self.store.lock().await;
        let booking = store
            .get_mut(id)
            .ok_or_else(|| BookingError::NotFound { id: id.to_string() })?;
        mutation(booking)?;
        Ok(booking.clone())
    }

    /// Apply a mutation after checking the actor is the buyer or an admin.
    pub(crate) async fn mutate_authorized<F>(
        &self,
        actor: &Actor,
        id: &BookingId,
        mutation: F,
    ) -> Result<Booking>
    where
        F: FnOnce(&mut Booking) -> Result<()>,
    {
        let mut store = self.store.lock().await;
        let booking = store
            .get_mut(id)
            .ok_or_else(|| BookingError::NotFound { id: id.to_string() })?;
        self.ensure_buyer_or_admin(actor, &booking.buyer)?;
        mutation(booking)?;
        Ok(booking.clone())
    }

    /// Read a booking after checking the actor is the buyer or an admin.
    pub(crate) async fn read_authorized(&self, actor: &Actor, id: &BookingId) -> Result<Booking> {
        self.get(actor, id).await
    }
}

impl std::fmt::Debug for BookingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingService").finish_non_exhaustive()
    }
}
