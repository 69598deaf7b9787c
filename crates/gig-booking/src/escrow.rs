//! Escrow control over bookings.
//!
//! An escrow booking's funds are held by the payment provider under a
//! manual-capture intent: reserved while the buyer checks out, authorized
//! once the hold exists, then captured (released to the payee) or voided.
//!
//! Provider calls are never made while holding the booking lock: the
//! expected state is validated before the call and re-validated before the
//! write, so a concurrent transition becomes an invalid-transition error
//! rather than a lost update.

use gig_core::{Actor, BookingId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::booking::{Booking, EscrowStatus};
use crate::error::{BookingError, Result};
use crate::provider::{CaptureMode, IntentStatus, PaymentProvider, SessionRequest};
use crate::service::BookingService;

/// Escrow operations over bookings.
#[derive(Clone)]
pub struct EscrowController {
    bookings: BookingService,
    provider: Arc<dyn PaymentProvider>,
}

impl EscrowController {
    /// Create a controller over a booking service and payment provider.
    #[must_use]
    pub fn new(bookings: BookingService, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { bookings, provider }
    }

    /// Reserve an escrow hold: create a manual-capture checkout session for
    /// the booking total. The booking stays `pending_payment` until the
    /// hold is confirmed.
    ///
    /// # Errors
    ///
    /// Returns forbidden, invalid-transition or provider errors.
    pub async fn reserve(&self, actor: &Actor, id: &BookingId) -> Result<Booking> {
        let booking = self.bookings.read_authorized(actor, id).await?;
        booking.ensure_can_reserve()?;

        let session = self
            .provider
            .create_checkout_session(SessionRequest {
                amount: booking.total_amount,
                capture: CaptureMode::Manual,
                metadata: HashMap::from([("booking_id".to_string(), id.to_string())]),
            })
            .await?;

        let booking = self
            .bookings
            .mutate(id, |booking| {
                booking.ensure_can_reserve()?;
                booking.record_escrow_session(session.id.clone(), session.payment_intent_id.clone());
                Ok(())
            })
            .await?;

        info!(
            booking = %id,
            session = %session.id,
            amount = %booking.total_amount,
            "escrow hold reserved"
        );
        Ok(booking)
    }

    /// Poll the checkout session; if its payment intent is ready to
    /// capture, mark the hold authorized and advance the booking to
    /// `payment_submitted`. Idempotent once authorized.
    ///
    /// # Errors
    ///
    /// Returns forbidden, invalid-transition or provider errors, including
    /// when the intent is not yet ready to capture.
    pub async fn confirm_reservation(&self, actor: &Actor, id: &BookingId) -> Result<Booking> {
        let booking = self.bookings.read_authorized(actor, id).await?;
        if booking.escrow_status == EscrowStatus::Authorized {
            return Ok(booking);
        }
        let session_id = booking.session_id.clone().ok_or_else(|| {
            BookingError::invalid_transition(booking.escrow_status.to_string(), "authorized")
        })?;

        let session = self.provider.retrieve_session(&session_id).await?;
        let intent = self
            .provider
            .retrieve_payment_intent(&session.payment_intent_id)
            .await?;
        if intent.status != IntentStatus::RequiresCapture {
            return Err(BookingError::Provider {
                message: format!(
                    "payment intent {} not ready to capture: {}",
                    intent.id, intent.status
                ),
            });
        }

        let booking = self
            .bookings
            .mutate(id, |booking| {
                if booking.escrow_status == EscrowStatus::Authorized {
                    // Confirmed concurrently; still a success.
                    return Ok(());
                }
                booking.authorize_escrow(intent.id.clone())
            })
            .await?;

        info!(booking = %id, intent = %intent.id, "escrow hold authorized");
        Ok(booking)
    }

    /// Release the held funds to the payee: capture the intent, mark the
    /// escrow captured and confirm the booking. Buyer or admin.
    ///
    /// # Errors
    ///
    /// Returns forbidden, invalid-transition or provider errors.
    pub async fn release(&self, actor: &Actor, id: &BookingId) -> Result<Booking> {
        let intent_id = self.authorized_intent(actor, id).await?;
        self.provider.capture_payment_intent(&intent_id).await?;

        let booking = self
            .bookings
            .mutate(id, Booking::capture_escrow)
            .await?;

        info!(booking = %id, intent = %intent_id, "escrow released");
        Ok(booking)
    }

    /// Void the held funds: cancel the intent, mark the escrow cancelled
    /// and cancel the booking. Buyer or admin.
    ///
    /// # Errors
    ///
    /// Returns forbidden, invalid-transition or provider errors.
    pub async fn cancel_escrow(&self, actor: &Actor, id: &BookingId) -> Result<Booking> {
        let intent_id = self.authorized_intent(actor, id).await?;
        self.provider.cancel_payment_intent(&intent_id).await?;

        let booking = self
            .bookings
            .mutate(id, Booking::cancel_escrow_hold)
            .await?;

        info!(booking = %id, intent = %intent_id, "escrow cancelled");
        Ok(booking)
    }

    /// Validate the booking holds an authorized escrow and return its
    /// intent ID.
    async fn authorized_intent(&self, actor: &Actor, id: &BookingId) -> Result<String> {
        let booking = self.bookings.read_authorized(actor, id).await?;
        if booking.escrow_status != EscrowStatus::Authorized {
            return Err(BookingError::invalid_transition(
                booking.escrow_status.to_string(),
                "captured",
            ));
        }
        booking.payment_intent_id.clone().ok_or_else(|| {
            BookingError::Provider {
                message: "authorized escrow has no payment intent".to_string(),
            }
        })
    }
}

impl std::fmt::Debug for EscrowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowController").finish_non_exhaustive()
    }
}
