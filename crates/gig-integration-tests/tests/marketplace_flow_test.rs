//! End-to-end integration tests for the gigboard marketplace core.
//!
//! Walks the full lifecycle across the crates:
//! 1. Credit account bootstrap and pack purchase
//! 2. Listing creation (gating, normalization, debit)
//! 3. Applications
//! 4. Split-payment booking lifecycle
//! 5. Escrow reserve/confirm/release
//! 6. Ledger consistency under concurrency

use std::sync::Arc;

use gig_booking::{
    BookingInput, BookingService, BookingStatus, EscrowController, EscrowStatus, Installment,
    PaymentMethod, PaymentStructure, SimulatedProvider,
};
use gig_core::{
    Actor, BoostLevel, Identity, Money, Plan, PlatformConfig, PostKind, StaticAllowList, Tier,
    UserId,
};
use gig_credits::{CreditLedger, Credits};
use gig_market::{
    EligibilityGate, ListingBoard, ListingInput, ReviewStatus, VerificationStore,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn actor(id: &str, email: &str, plan: Plan) -> Actor {
    Actor::authenticate(Some(Identity {
        user: UserId::from_string(id),
        email: email.to_string(),
        plan,
    }))
    .expect("identity present")
}

struct World {
    config: Arc<PlatformConfig>,
    store: VerificationStore,
    ledger: CreditLedger,
    board: ListingBoard,
    bookings: BookingService,
    escrow: EscrowController,
    provider: SimulatedProvider,
}

fn world() -> World {
    let config = Arc::new(
        PlatformConfig::builder()
            .admin_emails(["admin@gigboard.example"])
            .build(),
    );
    let store = VerificationStore::new();
    let gate = EligibilityGate::new(store.clone(), Arc::clone(&config));
    let ledger = CreditLedger::new();
    let board = ListingBoard::new(Arc::clone(&config), gate, ledger.clone());
    let authz = Arc::new(StaticAllowList::from_config(&config));
    let bookings = BookingService::new(Arc::clone(&config), authz);
    let provider = SimulatedProvider::new();
    let escrow = EscrowController::new(bookings.clone(), Arc::new(provider.clone()));
    World {
        config,
        store,
        ledger,
        board,
        bookings,
        escrow,
        provider,
    }
}

fn gig(title: &str, category: &str, tier: Tier, boost: BoostLevel) -> ListingInput {
    ListingInput {
        title: title.to_string(),
        category: category.to_string(),
        kind: PostKind::Gig,
        tier,
        boost,
        nsfw: false,
    }
}

// ============================================================================
// Phase 1: Credit Bootstrap and Purchase
// ============================================================================

#[tokio::test]
async fn credit_purchase_and_log_stay_consistent() {
    let w = world();
    let poster = actor("poster", "poster@example.com", Plan::Free);

    // Buying a pack on a fresh account bootstraps it: one init entry.
    w.ledger
        .credit_for_purchase(poster.user(), Credits::new(20), "pack of 20")
        .await
        .expect("purchase");
    let entries = w.ledger.entries(poster.user()).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 20);

    // Post a Projects gig with a 72h boost: 4 + 4 credits.
    w.board
        .create_listing(
            &poster,
            gig("Build a deck", "Gardening", Tier::Projects, BoostLevel::Boost72h),
        )
        .await
        .expect("create listing");

    let balance = w.ledger.balance(poster.user()).await.expect("initialized");
    assert_eq!(balance, Credits::new(12));

    let sum: i64 = w
        .ledger
        .entries(poster.user())
        .await
        .iter()
        .map(|entry| entry.amount)
        .sum();
    assert_eq!(sum, balance.amount() as i64);
}

// ============================================================================
// Phase 2: Listing Gates
// ============================================================================

#[tokio::test]
async fn licensed_category_gates_until_approved() {
    let w = world();
    let poster = actor("plumber", "plumber@example.com", Plan::Free);

    let input = gig("Fix pipes", "Skilled Trades", Tier::Tasks, BoostLevel::None);
    assert!(w.board.create_listing(&poster, input.clone()).await.is_err());

    // Approval for a different category does not help.
    w.store
        .record_professional_verification(poster.user(), "Healthcare", ReviewStatus::Approved);
    assert!(w.board.create_listing(&poster, input.clone()).await.is_err());

    w.store.record_professional_verification(
        poster.user(),
        "Skilled Trades",
        ReviewStatus::Approved,
    );
    w.board
        .create_listing(&poster, input)
        .await
        .expect("licensed now");
}

#[tokio::test]
async fn adult_club_event_is_always_age_gated() {
    let w = world();
    let poster = actor("promoter", "promoter@example.com", Plan::Elite);

    let post = w
        .board
        .create_listing(
            &poster,
            ListingInput {
                title: "Late night".to_string(),
                category: w.config.adult_event_category.clone(),
                kind: PostKind::Event,
                tier: Tier::Slots,
                boost: BoostLevel::None,
                nsfw: false,
            },
        )
        .await
        .expect("create event");
    assert!(post.nsfw);

    // Hidden from unverified viewers, visible once age-verified.
    let viewer = UserId::from_string("viewer");
    assert!(w.board.visible_posts(&viewer).await.is_empty());
    w.store
        .record_age_verification(&viewer, ReviewStatus::Approved, true);
    assert_eq!(w.board.visible_posts(&viewer).await.len(), 1);
}

// ============================================================================
// Phase 3: Applications
// ============================================================================

#[tokio::test]
async fn application_flow_debits_and_decides() {
    let w = world();
    let poster = actor("poster", "poster@example.com", Plan::Elite);
    let talent = actor("talent", "talent@example.com", Plan::Free);

    let post = w
        .board
        .create_listing(
            &poster,
            gig("Photograph a wedding", "Photography", Tier::Missions, BoostLevel::None),
        )
        .await
        .expect("create listing");

    let application = w.board.apply(&talent, &post.id).await.expect("apply");
    // Opening grant 3, application cost 1.
    assert_eq!(
        w.ledger.balance(talent.user()).await,
        Some(Credits::new(2))
    );

    let decided = w
        .board
        .respond(&poster, &application.id, true)
        .await
        .expect("accept");
    assert!(decided.status.is_decided());
}

// ============================================================================
// Phase 4: Split-Payment Booking
// ============================================================================

#[tokio::test]
async fn split_booking_walks_deposit_then_final() {
    let w = world();
    let buyer = actor("buyer", "buyer@example.com", Plan::Free);
    let admin = actor("root", "admin@gigboard.example", Plan::Free);

    let booking = w
        .bookings
        .create_booking(
            &buyer,
            BookingInput {
                post: None,
                worker_slug: Some("dj-nova".to_string()),
                tier: Tier::Projects,
                base_pay: Money::from_cents(9_801),
                boost: BoostLevel::None,
                structure: PaymentStructure::Split5050,
                method: PaymentMethod::Standard,
            },
        )
        .await
        .expect("create booking");

    // 98.01 + 2.00 fee = 100.01; deposit takes the ceiling cent.
    assert_eq!(booking.total_amount, Money::from_cents(10_001));
    assert_eq!(booking.deposit_amount, Some(Money::from_cents(5_001)));
    assert_eq!(booking.final_amount, Some(Money::from_cents(5_000)));

    // Final before deposit is rejected.
    assert!(w
        .bookings
        .mark_paid(&buyer, &booking.id, Some(Installment::Final), None)
        .await
        .is_err());

    let booking_state = w
        .bookings
        .mark_paid(&buyer, &booking.id, Some(Installment::Deposit), None)
        .await
        .expect("deposit submitted");
    assert_eq!(booking_state.status, BookingStatus::PaymentSubmitted);

    let booking_state = w
        .bookings
        .confirm_payment(&admin, &booking.id, Some(Installment::Deposit))
        .await
        .expect("deposit confirmed");
    assert_eq!(booking_state.status, BookingStatus::DepositPaid);

    let booking_state = w
        .bookings
        .mark_paid(&buyer, &booking.id, Some(Installment::Final), None)
        .await
        .expect("final submitted");
    assert_eq!(booking_state.status, BookingStatus::PaymentSubmitted);

    let booking_state = w
        .bookings
        .confirm_payment(&admin, &booking.id, Some(Installment::Final))
        .await
        .expect("final confirmed");
    assert_eq!(booking_state.status, BookingStatus::Confirmed);
}

// ============================================================================
// Phase 5: Escrow
// ============================================================================

#[tokio::test]
async fn escrow_reserve_confirm_release() {
    let w = world();
    let buyer = actor("buyer", "buyer@example.com", Plan::Free);

    let booking = w
        .bookings
        .create_booking(
            &buyer,
            BookingInput {
                post: None,
                worker_slug: Some("dj-nova".to_string()),
                tier: Tier::Missions,
                base_pay: Money::from_cents(50_000),
                boost: BoostLevel::None,
                structure: PaymentStructure::FullUpfront,
                method: PaymentMethod::Escrow,
            },
        )
        .await
        .expect("create booking");

    let booking = w
        .escrow
        .reserve(&buyer, &booking.id)
        .await
        .expect("reserve");
    assert_eq!(booking.status, BookingStatus::PendingPayment);

    // Not ready until the buyer completes checkout.
    assert!(w
        .escrow
        .confirm_reservation(&buyer, &booking.id)
        .await
        .is_err());

    w.provider
        .complete_checkout(booking.session_id.as_deref().expect("session"))
        .await
        .expect("complete checkout");

    let booking = w
        .escrow
        .confirm_reservation(&buyer, &booking.id)
        .await
        .expect("confirm");
    assert_eq!(booking.escrow_status, EscrowStatus::Authorized);
    assert_eq!(booking.status, BookingStatus::PaymentSubmitted);

    let booking = w
        .escrow
        .release(&buyer, &booking.id)
        .await
        .expect("release");
    assert_eq!(booking.escrow_status, EscrowStatus::Captured);
    assert_eq!(booking.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn escrow_cancel_voids_hold_and_booking() {
    let w = world();
    let buyer = actor("buyer", "buyer@example.com", Plan::Free);

    let booking = w
        .bookings
        .create_booking(
            &buyer,
            BookingInput {
                post: None,
                worker_slug: Some("dj-nova".to_string()),
                tier: Tier::Slots,
                base_pay: Money::from_cents(8_000),
                boost: BoostLevel::None,
                structure: PaymentStructure::FullUpfront,
                method: PaymentMethod::Escrow,
            },
        )
        .await
        .expect("create booking");

    let booking = w
        .escrow
        .reserve(&buyer, &booking.id)
        .await
        .expect("reserve");
    w.provider
        .complete_checkout(booking.session_id.as_deref().expect("session"))
        .await
        .expect("complete checkout");
    w.escrow
        .confirm_reservation(&buyer, &booking.id)
        .await
        .expect("confirm");

    let booking = w
        .escrow
        .cancel_escrow(&buyer, &booking.id)
        .await
        .expect("cancel escrow");
    assert_eq!(booking.escrow_status, EscrowStatus::Cancelled);
    assert_eq!(booking.status, BookingStatus::Cancelled);

    // A cancelled booking cannot be re-reserved.
    assert!(w.escrow.reserve(&buyer, &booking.id).await.is_err());
}

// ============================================================================
// Phase 6: Ledger Concurrency
// ============================================================================

#[tokio::test]
async fn concurrent_listing_debits_never_overdraw() {
    let w = world();
    let poster = actor("poster", "poster@example.com", Plan::Free);

    // Balance 10; two Chances gigs (5 credits each) can both post, a third
    // cannot.
    w.ledger
        .credit_for_purchase(poster.user(), Credits::new(10), "pack")
        .await
        .expect("purchase");

    let mut handles = Vec::new();
    for n in 0..3 {
        let board = w.board.clone();
        let poster = poster.clone();
        handles.push(tokio::spawn(async move {
            board
                .create_listing(
                    &poster,
                    ListingInput {
                        title: format!("Gig {n}"),
                        category: "Gardening".to_string(),
                        kind: PostKind::Gig,
                        tier: Tier::Chances,
                        boost: BoostLevel::None,
                        nsfw: false,
                    },
                )
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("task").is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 2);

    let balance = w.ledger.balance(poster.user()).await.expect("initialized");
    assert_eq!(balance, Credits::ZERO);

    let sum: i64 = w
        .ledger
        .entries(poster.user())
        .await
        .iter()
        .map(|entry| entry.amount)
        .sum();
    assert_eq!(sum, 0);
}
