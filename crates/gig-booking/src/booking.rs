//! Booking entity and lifecycle state machine.
//!
//! Bookings move `pending_payment → payment_submitted → confirmed`, with
//! `deposit_paid` reachable only under split payment and `cancelled`
//! reachable from any non-terminal state. Split bookings derive their
//! parent status from the two installment statuses through
//! [`derive_status`], re-run after every installment write.

use chrono::{DateTime, Utc};
use gig_core::{BookingId, BoostLevel, Money, PostId, Tier, UserId};
use gig_market::FeeBreakdown;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BookingError, Result};

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created; waiting for the buyer to pay.
    PendingPayment,
    /// The buyer submitted payment; awaiting confirmation.
    PaymentSubmitted,
    /// Split payment: the deposit is confirmed paid, the final is not.
    DepositPaid,
    /// Fully paid and confirmed. Terminal.
    Confirmed,
    /// Cancelled by the buyer or an admin. Terminal.
    Cancelled,
}

impl BookingStatus {
    /// Check if the status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingPayment => write!(f, "pending_payment"),
            Self::PaymentSubmitted => write!(f, "payment_submitted"),
            Self::DepositPaid => write!(f, "deposit_paid"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// How the booking total is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStructure {
    /// The whole amount in one payment.
    #[default]
    FullUpfront,
    /// Half up front (ceiling), half on completion.
    Split5050,
}

impl fmt::Display for PaymentStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullUpfront => write!(f, "full_upfront"),
            Self::Split5050 => write!(f, "split_50_50"),
        }
    }
}

/// Payment mode of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Standard checkout; funds transfer on payment.
    #[default]
    Standard,
    /// Escrow: funds are held by the provider until released.
    Escrow,
}

/// Status of one installment under split payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Not yet paid.
    #[default]
    Pending,
    /// The buyer submitted payment; awaiting confirmation.
    Submitted,
    /// Confirmed paid.
    Paid,
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Submitted => write!(f, "submitted"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// Which installment of a split payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Installment {
    /// The up-front deposit (ceiling half).
    Deposit,
    /// The remaining final payment.
    Final,
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Final => write!(f, "final"),
        }
    }
}

/// Escrow hold status, layered on top of the booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    /// No escrow hold.
    #[default]
    None,
    /// The provider holds the funds, not yet captured.
    Authorized,
    /// The hold was captured; funds transferred. Terminal.
    Captured,
    /// The hold was voided. Terminal.
    Cancelled,
    /// The captured funds were returned. Terminal.
    Refunded,
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Authorized => write!(f, "authorized"),
            Self::Captured => write!(f, "captured"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

/// Derive a split booking's parent status from its installment statuses.
///
/// Pure; applied after every installment write, never memoized from a
/// pre-fetch.
#[must_use]
pub const fn derive_status(deposit: InstallmentStatus, final_: InstallmentStatus) -> BookingStatus {
    use InstallmentStatus::{Paid, Pending, Submitted};
    match (deposit, final_) {
        (Paid, Paid) => BookingStatus::Confirmed,
        (Paid, Pending) => BookingStatus::DepositPaid,
        (Submitted, _) | (_, Submitted) => BookingStatus::PaymentSubmitted,
        _ => BookingStatus::PendingPayment,
    }
}

/// Input for creating a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingInput {
    /// The post being booked, if booking through a listing.
    pub post: Option<PostId>,
    /// The worker's profile slug, if booking directly.
    pub worker_slug: Option<String>,
    /// Listing tier, driving the platform fee.
    pub tier: Tier,
    /// Pay offered to the worker, in minor units.
    pub base_pay: Money,
    /// Attached boost, driving the boost fee.
    pub boost: BoostLevel,
    /// Full upfront or split payment.
    pub structure: PaymentStructure,
    /// Standard checkout or escrow.
    pub method: PaymentMethod,
}

/// A booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking ID.
    pub id: BookingId,
    /// The buying user.
    pub buyer: UserId,
    /// The post booked through, if any.
    pub post: Option<PostId>,
    /// The worker's profile slug, if booked directly.
    pub worker_slug: Option<String>,
    /// Listing tier.
    pub tier: Tier,
    /// Pay offered to the worker.
    pub base_pay: Money,
    /// Platform fee for the tier.
    pub platform_fee: Money,
    /// Attached boost.
    pub boost: BoostLevel,
    /// Fee for the boost.
    pub boost_fee: Money,
    /// `base_pay + platform_fee + boost_fee`.
    pub total_amount: Money,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Full upfront or split payment.
    pub payment_structure: PaymentStructure,
    /// Standard checkout or escrow.
    pub payment_method: PaymentMethod,
    /// Deposit amount (ceiling half); split bookings only.
    pub deposit_amount: Option<Money>,
    /// Final amount (remainder); split bookings only.
    pub final_amount: Option<Money>,
    /// Deposit installment status; split bookings only.
    pub deposit_status: Option<InstallmentStatus>,
    /// Final installment status; split bookings only.
    pub final_status: Option<InstallmentStatus>,
    /// Escrow hold status.
    pub escrow_status: EscrowStatus,
    /// Provider checkout-session ID, once a session exists.
    pub session_id: Option<String>,
    /// Provider payment-intent ID, once known.
    pub payment_intent_id: Option<String>,
    /// When the escrow hold was authorized.
    pub escrow_authorized_at: Option<DateTime<Utc>>,
    /// When the escrow hold was captured.
    pub escrow_captured_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a booking in `pending_payment` from validated input and a
    /// computed fee breakdown.
    #[must_use]
    pub fn new(buyer: UserId, input: BookingInput, fees: FeeBreakdown) -> Self {
        let now = Utc::now();
        let (deposit_amount, final_amount, deposit_status, final_status) = match input.structure {
            PaymentStructure::FullUpfront => (None, None, None, None),
            PaymentStructure::Split5050 => {
                let (deposit, final_) = fees.total_amount.split_half_up();
                (
                    Some(deposit),
                    Some(final_),
                    Some(InstallmentStatus::Pending),
                    Some(InstallmentStatus::Pending),
                )
            }
        };

        Self {
            id: BookingId::new(),
            buyer,
            post: input.post,
            worker_slug: input.worker_slug,
            tier: input.tier,
            base_pay: input.base_pay,
            platform_fee: fees.tier_fee,
            boost: input.boost,
            boost_fee: fees.boost_fee,
            total_amount: fees.total_amount,
            status: BookingStatus::PendingPayment,
            payment_structure: input.structure,
            payment_method: input.method,
            deposit_amount,
            final_amount,
            deposit_status,
            final_status,
            escrow_status: EscrowStatus::None,
            session_id: None,
            payment_intent_id: None,
            escrow_authorized_at: None,
            escrow_captured_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn ensure_not_terminal(&self, target: &str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(BookingError::invalid_transition(
                self.status.to_string(),
                target,
            ));
        }
        Ok(())
    }

    fn installment_status(&self, which: Installment) -> InstallmentStatus {
        let status = match which {
            Installment::Deposit => self.deposit_status,
            Installment::Final => self.final_status,
        };
        status.unwrap_or_default()
    }

    fn set_installment_status(&mut self, which: Installment, status: InstallmentStatus) {
        match which {
            Installment::Deposit => self.deposit_status = Some(status),
            Installment::Final => self.final_status = Some(status),
        }
        // The parent status is a pure function of the installment pair,
        // recomputed on every write regardless of caller.
        self.status = derive_status(
            self.deposit_status.unwrap_or_default(),
            self.final_status.unwrap_or_default(),
        );
        self.touch();
    }

    /// Buyer-submitted payment.
    ///
    /// Full upfront: moves `pending_payment → payment_submitted`. Split:
    /// marks the given installment `submitted`; the `final` installment is
    /// rejected until the deposit is confirmed paid.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] for out-of-order
    /// submissions and [`BookingError::Validation`] when the installment
    /// argument does not match the payment structure.
    pub fn mark_paid(
        &mut self,
        installment: Option<Installment>,
        session_id: Option<String>,
    ) -> Result<()> {
        self.ensure_not_terminal("payment_submitted")?;

        match self.payment_structure {
            PaymentStructure::FullUpfront => {
                if installment.is_some() {
                    return Err(BookingError::validation("installment"));
                }
                if self.status != BookingStatus::PendingPayment {
                    return Err(BookingError::invalid_transition(
                        self.status.to_string(),
                        "payment_submitted",
                    ));
                }
                if let Some(session_id) = session_id {
                    self.session_id = Some(session_id);
                }
                self.status = BookingStatus::PaymentSubmitted;
                self.touch();
                Ok(())
            }
            PaymentStructure::Split5050 => {
                let which = installment.ok_or_else(|| BookingError::validation("installment"))?;
                if which == Installment::Final
                    && self.installment_status(Installment::Deposit) != InstallmentStatus::Paid
                {
                    return Err(BookingError::invalid_transition(
                        format!("deposit {}", self.installment_status(Installment::Deposit)),
                        "final submitted",
                    ));
                }
                if self.installment_status(which) == InstallmentStatus::Paid {
                    return Err(BookingError::invalid_transition(
                        format!("{which} paid"),
                        format!("{which} submitted"),
                    ));
                }
                if let Some(session_id) = session_id {
                    self.session_id = Some(session_id);
                }
                self.set_installment_status(which, InstallmentStatus::Submitted);
                Ok(())
            }
        }
    }

    /// Admin confirmation of payment.
    ///
    /// Full upfront: moves the booking to `confirmed`. Split: marks the
    /// given installment `paid` and recomputes the parent status.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] from terminal states and
    /// [`BookingError::Validation`] when the installment argument does not
    /// match the payment structure.
    pub fn confirm_payment(&mut self, installment: Option<Installment>) -> Result<()> {
        self.ensure_not_terminal("confirmed")?;

        match self.payment_structure {
            PaymentStructure::FullUpfront => {
                if installment.is_some() {
                    return Err(BookingError::validation("installment"));
                }
                self.status = BookingStatus::Confirmed;
                self.touch();
                Ok(())
            }
            PaymentStructure::Split5050 => {
                let which = installment.ok_or_else(|| BookingError::validation("installment"))?;
                self.set_installment_status(which, InstallmentStatus::Paid);
                Ok(())
            }
        }
    }

    /// Cancel the booking. Valid from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] from terminal states.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_not_terminal("cancelled")?;
        self.status = BookingStatus::Cancelled;
        self.touch();
        Ok(())
    }

    /// Whether an escrow hold may be reserved right now.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for non-escrow bookings and
    /// [`BookingError::InvalidTransition`] outside `pending_payment` or
    /// when already authorized.
    pub fn ensure_can_reserve(&self) -> Result<()> {
        if self.payment_method != PaymentMethod::Escrow {
            return Err(BookingError::validation("payment_method"));
        }
        if self.status != BookingStatus::PendingPayment
            || self.escrow_status == EscrowStatus::Authorized
        {
            return Err(BookingError::invalid_transition(
                format!("{}/{}", self.status, self.escrow_status),
                "escrow reserved",
            ));
        }
        Ok(())
    }

    /// Record a created escrow checkout session.
    pub fn record_escrow_session(&mut self, session_id: String, payment_intent_id: String) {
        self.session_id = Some(session_id);
        self.payment_intent_id = Some(payment_intent_id);
        self.touch();
    }

    /// Mark the escrow hold authorized and advance to `payment_submitted`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] unless the booking is in
    /// `pending_payment` with no existing hold.
    pub fn authorize_escrow(&mut self, payment_intent_id: String) -> Result<()> {
        if self.status != BookingStatus::PendingPayment
            || self.escrow_status != EscrowStatus::None
        {
            return Err(BookingError::invalid_transition(
                format!("{}/{}", self.status, self.escrow_status),
                "authorized",
            ));
        }
        self.escrow_status = EscrowStatus::Authorized;
        self.payment_intent_id = Some(payment_intent_id);
        self.escrow_authorized_at = Some(Utc::now());
        self.status = BookingStatus::PaymentSubmitted;
        self.touch();
        Ok(())
    }

    /// Capture the authorized hold and confirm the booking.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] unless the hold is
    /// authorized.
    pub fn capture_escrow(&mut self) -> Result<()> {
        if self.escrow_status != EscrowStatus::Authorized {
            return Err(BookingError::invalid_transition(
                self.escrow_status.to_string(),
                "captured",
            ));
        }
        self.escrow_status = EscrowStatus::Captured;
        self.escrow_captured_at = Some(Utc::now());
        self.status = BookingStatus::Confirmed;
        self.touch();
        Ok(())
    }

    /// Void the authorized hold and cancel the booking.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] unless the hold is
    /// authorized.
    pub fn cancel_escrow_hold(&mut self) -> Result<()> {
        if self.escrow_status != EscrowStatus::Authorized {
            return Err(BookingError::invalid_transition(
                self.escrow_status.to_string(),
                "cancelled",
            ));
        }
        self.escrow_status = EscrowStatus::Cancelled;
        self.status = BookingStatus::Cancelled;
        self.touch();
        Ok(())
    }
}
