//! Bid lifecycle service
//!
//! Mirrors the tender service for the bidding side: authorization and
//! input validation happen here, row-level ownership checks happen in
//! the store.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::db::store::BidStore;
use crate::models::{Bid, BidDecision, BidPatch, BidStatus, NewBid, Page};
use crate::utils::{AppError, AppResult};

pub struct BidService {
    store: Arc<dyn BidStore>,
    policy: PolicyConfig,
}

impl BidService {
    pub fn new(store: Arc<dyn BidStore>, policy: PolicyConfig) -> Self {
        Self { store, policy }
    }

    /// Create a bid against a tender.
    ///
    /// By default any employee tied to the bidding organization (as a
    /// responsible or merely as a registered employee) may bid; the
    /// `strict_bid_authorization` policy flag narrows this to registered
    /// responsibles. The target tender must exist and not be canceled.
    /// The status is forced to `Created` regardless of the input.
    pub async fn create(&self, bid: NewBid) -> AppResult<Bid> {
        let authorized = if self.policy.strict_bid_authorization {
            self.store
                .is_user_responsible(&bid.creator_username, bid.organization_id)
                .await?
        } else {
            self.store
                .is_user_authorized_to_bid(&bid.creator_username, bid.organization_id)
                .await?
        };
        if !authorized {
            return Err(AppError::AccessDenied);
        }

        if !self.store.is_tender_valid(bid.tender_id).await? {
            return Err(AppError::TenderNotFound);
        }

        let bid = NewBid {
            status: BidStatus::Created,
            ..bid
        };
        self.store.create(bid).await
    }

    /// Bids created by the given user, newest first. An empty page is
    /// reported as `BidNotFound`.
    pub async fn list_by_creator(&self, username: &str, page: Page) -> AppResult<Vec<Bid>> {
        let bids = self.store.list_by_creator(username, page).await?;
        if bids.is_empty() {
            return Err(AppError::BidNotFound);
        }
        Ok(bids)
    }

    /// Bids the given user placed on a tender, newest first. The username
    /// must belong to a registered employee; an empty page is
    /// `BidNotFound`.
    pub async fn list_by_tender(
        &self,
        tender_id: Uuid,
        username: &str,
        page: Page,
    ) -> AppResult<Vec<Bid>> {
        if !self.store.user_exists(username).await? {
            return Err(AppError::UserNotFound);
        }
        let bids = self.store.list_by_tender(tender_id, username, page).await?;
        if bids.is_empty() {
            return Err(AppError::BidNotFound);
        }
        Ok(bids)
    }

    /// Partial update of title/description by the creator. The version is
    /// bumped even when no optional field was supplied.
    pub async fn update(&self, id: Uuid, username: &str, patch: BidPatch) -> AppResult<Bid> {
        self.store.update(id, username, patch.normalize()).await
    }

    pub async fn status(&self, id: Uuid, username: &str) -> AppResult<BidStatus> {
        self.store.status(id, username).await
    }

    /// Overwrite the bid status. Creator-only; the version counter is
    /// untouched because it tracks content edits.
    pub async fn update_status(&self, id: Uuid, username: &str, status: &str) -> AppResult<Bid> {
        let next = BidStatus::parse(status)
            .ok_or_else(|| AppError::unprocessable(format!("invalid bid status: {status:?}")))?;
        if self.policy.enforce_status_transitions {
            let current = self.store.status(id, username).await?;
            if !current.can_transition_to(next) {
                return Err(AppError::unprocessable(format!(
                    "bid status cannot move from {current} to {next}"
                )));
            }
        }
        self.store.update_status(id, username, next).await
    }

    /// Record the decision on a bid. Only `Approved` or `Rejected` are
    /// accepted, and only the creator of record may decide.
    pub async fn submit_decision(
        &self,
        id: Uuid,
        username: &str,
        decision: &str,
    ) -> AppResult<Bid> {
        let decision = BidDecision::parse(decision).ok_or_else(|| {
            AppError::unprocessable(format!("invalid bid decision: {decision:?}"))
        })?;
        self.store.update_decision(id, username, decision).await
    }
}
