//! Storage gateway traits
//!
//! The lifecycle services depend on these traits rather than on sqlx
//! directly, so the authorization/validation logic stays testable against
//! lightweight fakes. Absence of a row is a domain outcome (`false` for
//! the predicates, a typed not-found error for the entity operations);
//! only real storage failures surface as `AppError::Database`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Bid, BidDecision, BidPatch, BidStatus, NewBid, NewTender, Page, Tender, TenderPatch,
    TenderStatus,
};
use crate::utils::AppResult;

/// Persistence operations backing the tender lifecycle.
#[async_trait]
pub trait TenderStore: Send + Sync {
    /// Insert a new tender row. A `(organization, title)` uniqueness
    /// violation maps to [`AppError::TenderAlreadyExists`].
    ///
    /// [`AppError::TenderAlreadyExists`]: crate::utils::AppError::TenderAlreadyExists
    async fn create(&self, tender: NewTender) -> AppResult<Tender>;

    /// Page of tenders, newest first, optionally restricted to the given
    /// service types. An empty page is returned as-is; the service layer
    /// decides whether that is an error.
    async fn list(&self, service_types: &[String], page: Page) -> AppResult<Vec<Tender>>;

    /// Page of tenders created by `username`, newest first.
    async fn list_by_creator(&self, username: &str, page: Page) -> AppResult<Vec<Tender>>;

    /// Partial update scoped to the creator of record. The ownership
    /// check and the write happen in one transaction. Always bumps
    /// `version` and refreshes `updated_at`.
    async fn update(&self, id: Uuid, username: &str, patch: TenderPatch) -> AppResult<Tender>;

    /// Current status of a tender.
    async fn status(&self, id: Uuid) -> AppResult<TenderStatus>;

    /// Overwrite the status, re-asserting the creator and bumping the
    /// version. Same ownership rule as [`update`](TenderStore::update).
    async fn update_status(
        &self,
        id: Uuid,
        username: &str,
        status: TenderStatus,
    ) -> AppResult<Tender>;

    /// Whether an `organization_responsible` row links the employee named
    /// `username` to the organization.
    async fn is_user_responsible(&self, username: &str, organization_id: Uuid) -> AppResult<bool>;
}

/// Persistence operations backing the bid lifecycle.
#[async_trait]
pub trait BidStore: Send + Sync {
    /// Insert a new bid row. A `(tender, organization, title)` uniqueness
    /// violation maps to [`AppError::BidAlreadyExists`].
    ///
    /// [`AppError::BidAlreadyExists`]: crate::utils::AppError::BidAlreadyExists
    async fn create(&self, bid: NewBid) -> AppResult<Bid>;

    /// Page of bids created by `username`, newest first.
    async fn list_by_creator(&self, username: &str, page: Page) -> AppResult<Vec<Bid>>;

    /// Page of bids on a tender, restricted to the ones created by
    /// `username`, newest first.
    async fn list_by_tender(
        &self,
        tender_id: Uuid,
        username: &str,
        page: Page,
    ) -> AppResult<Vec<Bid>>;

    /// Partial update of title/description, scoped by id and creator in
    /// one transaction. Bumps `version` and refreshes `updated_at`.
    async fn update(&self, id: Uuid, username: &str, patch: BidPatch) -> AppResult<Bid>;

    /// Current status of a bid, visible only to its creator.
    async fn status(&self, id: Uuid, username: &str) -> AppResult<BidStatus>;

    /// Overwrite the status, scoped by id and creator. Refreshes
    /// `updated_at` but does not touch `version`.
    async fn update_status(&self, id: Uuid, username: &str, status: BidStatus) -> AppResult<Bid>;

    /// Record the terminal decision on a bid. Only the creator of record
    /// may decide; nothing else on the row changes.
    async fn update_decision(
        &self,
        id: Uuid,
        username: &str,
        decision: BidDecision,
    ) -> AppResult<Bid>;

    /// The permissive authorization rule for bid creation: the user is
    /// responsible for the organization, or is simply a known employee.
    async fn is_user_authorized_to_bid(
        &self,
        username: &str,
        organization_id: Uuid,
    ) -> AppResult<bool>;

    /// Strict variant: responsible for the organization only.
    async fn is_user_responsible(&self, username: &str, organization_id: Uuid) -> AppResult<bool>;

    /// A tender can take bids while it exists and is not canceled.
    async fn is_tender_valid(&self, tender_id: Uuid) -> AppResult<bool>;

    /// Whether an employee with this username is registered.
    async fn user_exists(&self, username: &str) -> AppResult<bool>;
}
