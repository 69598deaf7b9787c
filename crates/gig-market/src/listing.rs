//! Listings and the listing board.
//!
//! The board owns posts and applications. Listing creation runs the full
//! pipeline: NSFW normalization, eligibility gating, cost calculation,
//! credit debit, post insert, then best-effort follower notification.

use chrono::{DateTime, Utc};
use gig_core::{Actor, ApplicationId, AuthzError, BoostLevel, PlatformConfig, PostId, PostKind, Tier, UserId};
use gig_credits::{CreditLedger, Credits, LedgerError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::{Application, ApplicationStatus};
use crate::eligibility::EligibilityGate;
use crate::error::{MarketError, Result};
use crate::notify::{NoopNotifier, Notifier};
use crate::pricing::{can_afford, PriceBook};

/// A listing post. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique post ID.
    pub id: PostId,
    /// The posting user.
    pub owner: UserId,
    /// Listing title.
    pub title: String,
    /// Gig or event.
    pub kind: PostKind,
    /// Job category.
    pub category: String,
    /// Listing tier.
    pub tier: Tier,
    /// Whether the post sits behind the age gate. Normalized at creation:
    /// posts in the NSFW category and adult-club events are always true.
    pub nsfw: bool,
    /// Attached boost.
    pub boost: BoostLevel,
    /// When the boost expires; `None` without a boost.
    pub boost_expires_at: Option<DateTime<Utc>>,
    /// Whether the owner was age-verified at creation time.
    pub verified: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// The boost rank used for ordering; expired boosts rank as none.
    #[must_use]
    pub fn active_boost_rank(&self, now: DateTime<Utc>) -> u8 {
        match self.boost_expires_at {
            Some(expires_at) if expires_at > now => self.boost.rank(),
            _ => 0,
        }
    }
}

/// Input for creating a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingInput {
    /// Listing title.
    pub title: String,
    /// Job category.
    pub category: String,
    /// Gig or event.
    pub kind: PostKind,
    /// Listing tier.
    pub tier: Tier,
    /// Requested boost.
    pub boost: BoostLevel,
    /// Caller-supplied NSFW flag; normalization may force it on.
    pub nsfw: bool,
}

#[derive(Debug, Default)]
struct BoardState {
    posts: HashMap<PostId, Post>,
    applications: HashMap<ApplicationId, Application>,
    applied: HashSet<(PostId, UserId)>,
}

/// The listing board service.
#[derive(Clone)]
pub struct ListingBoard {
    config: Arc<PlatformConfig>,
    gate: EligibilityGate,
    prices: PriceBook,
    ledger: CreditLedger,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<BoardState>>,
}

impl ListingBoard {
    /// Create a board with the default (no-op) notifier.
    #[must_use]
    pub fn new(
        config: Arc<PlatformConfig>,
        gate: EligibilityGate,
        ledger: CreditLedger,
    ) -> Self {
        Self::with_notifier(config, gate, ledger, Arc::new(NoopNotifier))
    }

    /// Create a board with a custom follower notifier.
    #[must_use]
    pub fn with_notifier(
        config: Arc<PlatformConfig>,
        gate: EligibilityGate,
        ledger: CreditLedger,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            prices: PriceBook::new(Arc::clone(&config)),
            config,
            gate,
            ledger,
            notifier,
            state: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    /// The board's price book.
    #[must_use]
    pub fn prices(&self) -> &PriceBook {
        &self.prices
    }

    /// Create a listing.
    ///
    /// All fallible checks run before the debit; after the debit only the
    /// post insert (infallible) and the best-effort notification remain, so
    /// the debit and the creation are a single unit.
    ///
    /// # Errors
    ///
    /// Returns validation, license or insufficient-credit errors; the
    /// balance is untouched on any failure.
    pub async fn create_listing(&self, actor: &Actor, input: ListingInput) -> Result<Post> {
        if input.title.trim().is_empty() {
            return Err(MarketError::validation("title"));
        }
        if input.category.trim().is_empty() {
            return Err(MarketError::validation("category"));
        }

        let owner = actor.user().clone();
        let nsfw = self
            .gate
            .normalize_nsfw(&input.category, input.kind, input.nsfw);
        self.gate
            .can_post_in_category(&owner, &input.category, input.kind == PostKind::Event)?;

        // Accounts are created lazily, with the configured opening grant.
        self.ledger
            .initialize(&owner, Credits::new(self.config.starting_credits))
            .await;

        let cost = self
            .prices
            .total_credit_cost(input.kind, nsfw, input.tier, input.boost);
        let balance = self.ledger.balance(&owner).await.unwrap_or_default();
        if !can_afford(actor.plan(), balance, cost) {
            return Err(LedgerError::insufficient(cost.amount(), balance.amount()).into());
        }
        if !actor.plan().is_unlimited() && !cost.is_zero() {
            self.ledger
                .debit_for_listing(
                    &owner,
                    cost,
                    input.kind == PostKind::Event,
                    format!("posted \"{}\"", input.title.trim()),
                )
                .await?;
        }

        let now = Utc::now();
        let post = Post {
            id: PostId::new(),
            owner: owner.clone(),
            title: input.title.trim().to_string(),
            kind: input.kind,
            category: input.category.clone(),
            tier: input.tier,
            nsfw,
            boost: input.boost,
            boost_expires_at: self.prices.boost_expiry(input.boost, now),
            verified: self.gate.is_age_verified(&owner),
            created_at: now,
        };

        {
            let mut state = self.state.lock().await;
            state.posts.insert(post.id.clone(), post.clone());
        }

        info!(
            post = %post.id,
            owner = %owner,
            kind = %post.kind,
            cost = %cost,
            "listing created"
        );

        // Best-effort: a notification failure never fails the listing.
        if let Err(error) = self.notifier.notify_followers(&owner, &post) {
            warn!(post = %post.id, error = %error, "follower notification failed");
        }

        Ok(post)
    }

    /// Get a post by ID.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PostNotFound`] when the ID does not resolve.
    pub async fn get_post(&self, id: &PostId) -> Result<Post> {
        let state = self.state.lock().await;
        state
            .posts
            .get(id)
            .cloned()
            .ok_or_else(|| MarketError::PostNotFound { id: id.to_string() })
    }

    /// Posts visible to the viewer, in the documented order: active boosts
    /// first (higher level first), then newest first. Age-gated posts are
    /// hidden from viewers who cannot view NSFW content.
    pub async fn visible_posts(&self, viewer: &UserId) -> Vec<Post> {
        let now = Utc::now();
        let can_view_nsfw = self.gate.can_view_nsfw(viewer);

        let state = self.state.lock().await;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|post| can_view_nsfw || !self.gate.requires_age_gate(&post.category, post.nsfw))
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.active_boost_rank(now)
                .cmp(&a.active_boost_rank(now))
                .then(b.created_at.cmp(&a.created_at))
        });
        posts
    }

    /// Apply to a post.
    ///
    /// Debits the application cost; the debit and the application insert
    /// are a single unit, and a duplicate application performs no debit.
    ///
    /// # Errors
    ///
    /// Returns not-found, own-post, duplicate or insufficient-credit
    /// errors.
    pub async fn apply(&self, actor: &Actor, post_id: &PostId) -> Result<Application> {
        let applicant = actor.user().clone();

        // The duplicate check, debit and insert stay under one lock so two
        // concurrent applies cannot both pass the uniqueness check.
        let mut state = self.state.lock().await;

        let post = state
            .posts
            .get(post_id)
            .ok_or_else(|| MarketError::PostNotFound {
                id: post_id.to_string(),
            })?;
        if post.owner == applicant {
            return Err(MarketError::OwnPost);
        }
        if state.applied.contains(&(post_id.clone(), applicant.clone())) {
            return Err(MarketError::AlreadyApplied {
                post: post_id.to_string(),
            });
        }

        let cost = Credits::new(self.config.application_cost);
        self.ledger
            .initialize(&applicant, Credits::new(self.config.starting_credits))
            .await;
        if !cost.is_zero() {
            self.ledger
                .debit_for_application(&applicant, cost, format!("applied to {post_id}"))
                .await?;
        }

        let application = Application::new(post_id.clone(), applicant.clone());
        state
            .applied
            .insert((post_id.clone(), applicant.clone()));
        state
            .applications
            .insert(application.id.clone(), application.clone());

        info!(
            application = %application.id,
            post = %post_id,
            applicant = %applicant,
            "application submitted"
        );
        Ok(application)
    }

    /// Respond to an application. Post-owner only; terminal once decided.
    ///
    /// # Errors
    ///
    /// Returns not-found, forbidden or already-decided errors.
    pub async fn respond(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        accept: bool,
    ) -> Result<Application> {
        let mut state = self.state.lock().await;

        let application = state.applications.get(application_id).cloned().ok_or_else(|| {
            MarketError::ApplicationNotFound {
                id: application_id.to_string(),
            }
        })?;
        let post = state
            .posts
            .get(&application.post)
            .ok_or_else(|| MarketError::PostNotFound {
                id: application.post.to_string(),
            })?;
        if post.owner != *actor.user() {
            return Err(AuthzError::forbidden("only the post owner may respond").into());
        }
        if application.status.is_decided() {
            return Err(MarketError::AlreadyDecided {
                status: application.status.to_string(),
            });
        }

        let mut updated = application;
        updated.status = if accept {
            ApplicationStatus::Accepted
        } else {
            ApplicationStatus::Rejected
        };
        updated.decided_at = Some(Utc::now());
        state
            .applications
            .insert(application_id.clone(), updated.clone());

        info!(
            application = %application_id,
            status = %updated.status,
            "application decided"
        );
        Ok(updated)
    }

    /// Applications submitted to a post. Post-owner only.
    ///
    /// # Errors
    ///
    /// Returns not-found or forbidden errors.
    pub async fn applications_for_post(
        &self,
        actor: &Actor,
        post_id: &PostId,
    ) -> Result<Vec<Application>> {
        let state = self.state.lock().await;
        let post = state
            .posts
            .get(post_id)
            .ok_or_else(|| MarketError::PostNotFound {
                id: post_id.to_string(),
            })?;
        if post.owner != *actor.user() {
            return Err(AuthzError::forbidden("only the post owner may list applications").into());
        }
        Ok(state
            .applications
            .values()
            .filter(|application| application.post == *post_id)
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for ListingBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingBoard")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::{ReviewStatus, VerificationStore};
    use crate::notify::NotifyError;
    use gig_core::{Identity, Plan};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn actor(id: &str, plan: Plan) -> Actor {
        Actor::authenticate(Some(Identity {
            user: UserId::from_string(id),
            email: format!("{id}@example.com"),
            plan,
        }))
        .expect("identity present")
    }

    fn gig_input(title: &str) -> ListingInput {
        ListingInput {
            title: title.to_string(),
            category: "Gardening".to_string(),
            kind: PostKind::Gig,
            tier: Tier::Slots,
            boost: BoostLevel::None,
            nsfw: false,
        }
    }

    fn board() -> (ListingBoard, VerificationStore, CreditLedger) {
        let config = Arc::new(PlatformConfig::default());
        let store = VerificationStore::new();
        let gate = EligibilityGate::new(store.clone(), Arc::clone(&config));
        let ledger = CreditLedger::new();
        let board = ListingBoard::new(config, gate, ledger.clone());
        (board, store, ledger)
    }

    #[tokio::test]
    async fn test_create_listing_debits_cost() {
        let (board, _, ledger) = board();
        let poster = actor("u1", Plan::Free);
        ledger
            .credit_for_purchase(poster.user(), Credits::new(10), "pack")
            .await
            .expect("credit");

        let post = board
            .create_listing(&poster, gig_input("Mow my lawn"))
            .await
            .expect("should create");
        assert_eq!(post.tier, Tier::Slots);

        // Slots costs 1 credit.
        assert_eq!(
            ledger.balance(poster.user()).await,
            Some(Credits::new(9))
        );
    }

    #[tokio::test]
    async fn test_create_listing_initializes_account_lazily() {
        let (board, _, ledger) = board();
        let poster = actor("new-user", Plan::Free);

        board
            .create_listing(&poster, gig_input("First gig"))
            .await
            .expect("should create");

        // Opening grant of 3, minus the Slots cost of 1.
        assert_eq!(
            ledger.balance(poster.user()).await,
            Some(Credits::new(2))
        );
    }

    #[tokio::test]
    async fn test_create_listing_insufficient_credits_aborts() {
        let (board, _, ledger) = board();
        let poster = actor("u1", Plan::Free);

        // Opening grant is 3; a Chances gig with a 7-day feature costs 13.
        let mut input = gig_input("Big job");
        input.tier = Tier::Chances;
        input.boost = BoostLevel::Featured7d;

        let err = board.create_listing(&poster, input).await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Ledger(LedgerError::InsufficientCredits {
                required: 13,
                available: 3
            })
        ));

        // Nothing was created and the balance is untouched.
        assert_eq!(
            ledger.balance(poster.user()).await,
            Some(Credits::new(3))
        );
        assert!(board.visible_posts(poster.user()).await.is_empty());
    }

    #[tokio::test]
    async fn test_elite_plan_skips_debit() {
        let (board, _, ledger) = board();
        let poster = actor("vip", Plan::Elite);

        let mut input = gig_input("Premium gig");
        input.tier = Tier::Chances;
        input.boost = BoostLevel::Featured7d;

        board
            .create_listing(&poster, input)
            .await
            .expect("elite always affords");

        // Only the opening grant is in the ledger; no debit entry.
        assert_eq!(
            ledger.balance(poster.user()).await,
            Some(Credits::new(3))
        );
        assert_eq!(ledger.entries(poster.user()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_licensed_category_requires_verification() {
        let (board, store, _) = board();
        let poster = actor("u1", Plan::Free);

        let mut input = gig_input("Rewire my house");
        input.category = "Skilled Trades".to_string();

        let err = board
            .create_listing(&poster, input.clone())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::LicenseRequired { ref category } if category == "Skilled Trades"
        ));

        store.record_professional_verification(
            poster.user(),
            "Skilled Trades",
            ReviewStatus::Approved,
        );
        board
            .create_listing(&poster, input)
            .await
            .expect("licensed now");
    }

    #[tokio::test]
    async fn test_adult_event_forced_nsfw() {
        let (board, _, _) = board();
        let poster = actor("u1", Plan::Elite);

        let input = ListingInput {
            title: "Club night".to_string(),
            category: "Adult Club Event".to_string(),
            kind: PostKind::Event,
            tier: Tier::Slots,
            boost: BoostLevel::None,
            nsfw: false,
        };
        let post = board
            .create_listing(&poster, input)
            .await
            .expect("should create");
        assert!(post.nsfw);
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_title() {
        let (board, _, _) = board();
        let err = board
            .create_listing(&actor("u1", Plan::Free), gig_input("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation { ref field } if field == "title"));
    }

    #[tokio::test]
    async fn test_boost_sets_expiry() {
        let (board, _, _) = board();
        let mut input = gig_input("Boosted gig");
        input.boost = BoostLevel::Boost24h;

        let post = board
            .create_listing(&actor("vip", Plan::Elite), input)
            .await
            .expect("should create");
        assert!(post.boost_expires_at.is_some());
    }

    #[tokio::test]
    async fn test_visible_posts_hides_age_gated() {
        let (board, store, _) = board();
        let poster = actor("poster", Plan::Elite);

        board
            .create_listing(&poster, gig_input("Plain gig"))
            .await
            .expect("create");
        let mut nsfw_input = gig_input("Adult gig");
        nsfw_input.category = "Adult".to_string();
        board
            .create_listing(&poster, nsfw_input)
            .await
            .expect("create");

        let viewer = UserId::from_string("viewer");
        assert_eq!(board.visible_posts(&viewer).await.len(), 1);

        store.record_age_verification(&viewer, ReviewStatus::Approved, true);
        assert_eq!(board.visible_posts(&viewer).await.len(), 2);
    }

    #[tokio::test]
    async fn test_visible_posts_boosted_first() {
        let (board, _, _) = board();
        let poster = actor("poster", Plan::Elite);

        let plain = board
            .create_listing(&poster, gig_input("Plain"))
            .await
            .expect("create");
        let mut boosted_input = gig_input("Boosted");
        boosted_input.boost = BoostLevel::Featured7d;
        let boosted = board
            .create_listing(&poster, boosted_input)
            .await
            .expect("create");

        let posts = board.visible_posts(poster.user()).await;
        assert_eq!(posts[0].id, boosted.id);
        assert_eq!(posts[1].id, plain.id);
    }

    #[tokio::test]
    async fn test_apply_debits_and_rejects_duplicates() {
        let (board, _, ledger) = board();
        let poster = actor("poster", Plan::Elite);
        let talent = actor("talent", Plan::Free);

        let post = board
            .create_listing(&poster, gig_input("Gig"))
            .await
            .expect("create");

        board.apply(&talent, &post.id).await.expect("first apply");
        // Opening grant 3, application cost 1.
        assert_eq!(
            ledger.balance(talent.user()).await,
            Some(Credits::new(2))
        );

        let err = board.apply(&talent, &post.id).await.unwrap_err();
        assert!(matches!(err, MarketError::AlreadyApplied { .. }));
        // The failed duplicate performed no debit.
        assert_eq!(
            ledger.balance(talent.user()).await,
            Some(Credits::new(2))
        );
    }

    #[tokio::test]
    async fn test_apply_to_own_post_rejected() {
        let (board, _, _) = board();
        let poster = actor("poster", Plan::Elite);
        let post = board
            .create_listing(&poster, gig_input("Gig"))
            .await
            .expect("create");

        let err = board.apply(&poster, &post.id).await.unwrap_err();
        assert!(matches!(err, MarketError::OwnPost));
    }

    #[tokio::test]
    async fn test_respond_owner_only_and_terminal() {
        let (board, _, _) = board();
        let poster = actor("poster", Plan::Elite);
        let talent = actor("talent", Plan::Free);

        let post = board
            .create_listing(&poster, gig_input("Gig"))
            .await
            .expect("create");
        let application = board.apply(&talent, &post.id).await.expect("apply");

        // The applicant cannot respond.
        let err = board
            .respond(&talent, &application.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Authz(AuthzError::Forbidden { .. })));

        let decided = board
            .respond(&poster, &application.id, true)
            .await
            .expect("owner responds");
        assert_eq!(decided.status, ApplicationStatus::Accepted);
        assert!(decided.decided_at.is_some());

        // Terminal once decided.
        let err = board
            .respond(&poster, &application.id, false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::AlreadyDecided { ref status } if status == "accepted"
        ));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_creation() {
        struct FailingNotifier {
            calls: AtomicUsize,
        }
        impl Notifier for FailingNotifier {
            fn notify_followers(&self, _owner: &UserId, _post: &Post) -> std::result::Result<(), NotifyError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(NotifyError::new("downstream unavailable"))
            }
        }

        let config = Arc::new(PlatformConfig::default());
        let gate = EligibilityGate::new(VerificationStore::new(), Arc::clone(&config));
        let ledger = CreditLedger::new();
        let notifier = Arc::new(FailingNotifier {
            calls: AtomicUsize::new(0),
        });
        let board = ListingBoard::with_notifier(
            Arc::clone(&config),
            gate,
            ledger.clone(),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );

        let poster = actor("u1", Plan::Free);
        let post = board
            .create_listing(&poster, gig_input("Gig"))
            .await
            .expect("creation survives notifier failure");

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
        // The debit stands; nothing was rolled back.
        assert_eq!(
            ledger.balance(poster.user()).await,
            Some(Credits::new(2))
        );
        assert!(board.get_post(&post.id).await.is_ok());
    }
}
