//! # gig-booking
//!
//! Booking lifecycle and escrow control for the gigboard marketplace.
//!
//! This crate provides:
//!
//! - [`Booking`] — The booking entity and its state machine
//! - [`derive_status`] — Pure parent-status derivation for split payments
//! - [`BookingService`] — Create/transition/cancel with authorization
//! - [`EscrowController`] — Hold/capture/void via the payment provider
//! - [`PaymentProvider`] — Object-safe provider seam with a simulated
//!   backend for development and tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod booking;
pub mod error;
pub mod escrow;
pub mod provider;
pub mod service;

pub use booking::{
    derive_status, Booking, BookingInput, BookingStatus, EscrowStatus, Installment,
    InstallmentStatus, PaymentMethod, PaymentStructure,
};
pub use error::{BookingError, Result};
pub use escrow::EscrowController;
pub use provider::{
    CaptureMode, CheckoutSession, IntentStatus, PaymentIntent, PaymentProvider, ProviderError,
    ProviderFuture, ProviderResult, SessionDetails, SessionPaymentStatus, SessionRequest,
    SimulatedProvider,
};
pub use service::BookingService;
