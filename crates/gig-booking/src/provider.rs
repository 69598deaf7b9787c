//! Payment provider interface.
//!
//! The core only drives the payment-intent lifecycle: create a checkout
//! session, poll it, capture or cancel the intent behind it. Provider
//! failures surface to the caller; the core never retries.
//!
//! [`SimulatedProvider`] is the development/test backend; a real gateway
//! implements [`PaymentProvider`] behind the same object-safe seam.

use gig_core::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// A payment provider failure.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Description of the failure.
    pub message: String,
}

impl ProviderError {
    /// Create a provider error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// How the payment intent captures funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Funds transfer as soon as the buyer pays.
    Automatic,
    /// Funds are held until explicitly captured (escrow).
    Manual,
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Amount to collect, in minor units.
    pub amount: Money,
    /// Capture mode of the underlying intent.
    pub capture: CaptureMode,
    /// Opaque metadata echoed back by the provider.
    pub metadata: HashMap<String, String>,
}

/// A created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Session ID.
    pub id: String,
    /// Hosted checkout URL for the buyer.
    pub url: String,
    /// The payment intent behind the session.
    pub payment_intent_id: String,
}

/// Payment state of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPaymentStatus {
    /// The buyer has not completed checkout.
    Unpaid,
    /// The buyer completed checkout.
    Paid,
}

/// A retrieved checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetails {
    /// Session ID.
    pub id: String,
    /// Whether the buyer completed checkout.
    pub payment_status: SessionPaymentStatus,
    /// The payment intent behind the session.
    pub payment_intent_id: String,
}

/// Status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Waiting for the buyer to pay.
    RequiresPayment,
    /// Paid under manual capture; the hold is ready to capture.
    RequiresCapture,
    /// Funds transferred.
    Succeeded,
    /// The intent was cancelled; any hold is voided.
    Canceled,
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiresPayment => write!(f, "requires_payment"),
            Self::RequiresCapture => write!(f, "requires_capture"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

/// A retrieved payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Intent ID.
    pub id: String,
    /// Current status.
    pub status: IntentStatus,
    /// Amount, in minor units.
    pub amount: Money,
}

/// Boxed provider future, so the trait stays object-safe.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = ProviderResult<T>> + Send + 'a>>;

/// Payment provider seam.
///
/// Only payment-intent lifecycle calls; account/connect APIs are out of
/// scope.
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session for the given amount and capture mode.
    fn create_checkout_session<'a>(
        &'a self,
        request: SessionRequest,
    ) -> ProviderFuture<'a, CheckoutSession>;

    /// Retrieve a checkout session.
    fn retrieve_session<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, SessionDetails>;

    /// Retrieve a payment intent.
    fn retrieve_payment_intent<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, PaymentIntent>;

    /// Capture a held payment intent.
    fn capture_payment_intent<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, PaymentIntent>;

    /// Cancel a payment intent, voiding any hold.
    fn cancel_payment_intent<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, PaymentIntent>;
}

#[derive(Debug, Clone)]
struct SimSession {
    details: SessionDetails,
    capture: CaptureMode,
}

#[derive(Debug, Default)]
struct SimState {
    sessions: HashMap<String, SimSession>,
    intents: HashMap<String, PaymentIntent>,
}

/// In-memory payment provider for development and tests.
#[derive(Debug, Clone, Default)]
pub struct SimulatedProvider {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedProvider {
    /// Create an empty simulated provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the buyer completing checkout.
    ///
    /// Moves the session to paid and its intent to `requires_capture`
    /// (manual capture) or `succeeded` (automatic).
    ///
    /// # Errors
    ///
    /// Returns error for an unknown session.
    pub async fn complete_checkout(&self, session_id: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| ProviderError::new(format!("no such session: {session_id}")))?;
        session.details.payment_status = SessionPaymentStatus::Paid;

        let intent_id = session.details.payment_intent_id.clone();
        let target = match session.capture {
            CaptureMode::Manual => IntentStatus::RequiresCapture,
            CaptureMode::Automatic => IntentStatus::Succeeded,
        };
        let intent = state
            .intents
            .get_mut(&intent_id)
            .ok_or_else(|| ProviderError::new(format!("no such intent: {intent_id}")))?;
        intent.status = target;

        debug!(session = %session_id, intent = %intent_id, status = %target, "checkout completed");
        Ok(())
    }
}

impl PaymentProvider for SimulatedProvider {
    fn create_checkout_session<'a>(
        &'a self,
        request: SessionRequest,
    ) -> ProviderFuture<'a, CheckoutSession> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let session_id = format!("cs_sim_{}", Uuid::new_v4().simple());
            let intent_id = format!("pi_sim_{}", Uuid::new_v4().simple());

            state.intents.insert(
                intent_id.clone(),
                PaymentIntent {
                    id: intent_id.clone(),
                    status: IntentStatus::RequiresPayment,
                    amount: request.amount,
                },
            );
            state.sessions.insert(
                session_id.clone(),
                SimSession {
                    details: SessionDetails {
                        id: session_id.clone(),
                        payment_status: SessionPaymentStatus::Unpaid,
                        payment_intent_id: intent_id.clone(),
                    },
                    capture: request.capture,
                },
            );

            debug!(session = %session_id, amount = %request.amount, "checkout session created");
            Ok(CheckoutSession {
                url: format!("https://checkout.sim.local/{session_id}"),
                id: session_id,
                payment_intent_id: intent_id,
            })
        })
    }

    fn retrieve_session<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, SessionDetails> {
        Box::pin(async move {
            let state = self.state.lock().await;
            state
                .sessions
                .get(id)
                .map(|session| session.details.clone())
                .ok_or_else(|| ProviderError::new(format!("no such session: {id}")))
        })
    }

    fn retrieve_payment_intent<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, PaymentIntent> {
        Box::pin(async move {
            let state = self.state.lock().await;
            state
                .intents
                .get(id)
                .cloned()
                .ok_or_else(|| ProviderError::new(format!("no such intent: {id}")))
        })
    }

    fn capture_payment_intent<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, PaymentIntent> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let intent = state
                .intents
                .get_mut(id)
                .ok_or_else(|| ProviderError::new(format!("no such intent: {id}")))?;
            if intent.status != IntentStatus::RequiresCapture {
                return Err(ProviderError::new(format!(
                    "cannot capture intent in status {}",
                    intent.status
                )));
            }
            intent.status = IntentStatus::Succeeded;
            debug!(intent = %id, "payment intent captured");
            Ok(intent.clone())
        })
    }

    fn cancel_payment_intent<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, PaymentIntent> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let intent = state
                .intents
                .get_mut(id)
                .ok_or_else(|| ProviderError::new(format!("no such intent: {id}")))?;
            if matches!(intent.status, IntentStatus::Succeeded | IntentStatus::Canceled) {
                return Err(ProviderError::new(format!(
                    "cannot cancel intent in status {}",
                    intent.status
                )));
            }
            intent.status = IntentStatus::Canceled;
            debug!(intent = %id, "payment intent cancelled");
            Ok(intent.clone())
        })
    }
}
