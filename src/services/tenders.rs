//! Tender lifecycle service
//!
//! Orchestrates create/list/update/status-transition for tenders. Every
//! operation re-reads authorization facts from storage; nothing is cached
//! between calls.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::db::store::TenderStore;
use crate::models::{NewTender, Page, Tender, TenderPatch, TenderStatus};
use crate::utils::{AppError, AppResult};

pub struct TenderService {
    store: Arc<dyn TenderStore>,
    policy: PolicyConfig,
}

impl TenderService {
    pub fn new(store: Arc<dyn TenderStore>, policy: PolicyConfig) -> Self {
        Self { store, policy }
    }

    /// Create a tender on behalf of an organization.
    ///
    /// The caller must be a registered responsible of the organization;
    /// the status is forced to `Created` regardless of the input.
    pub async fn create(&self, tender: NewTender) -> AppResult<Tender> {
        let responsible = self
            .store
            .is_user_responsible(&tender.creator_username, tender.organization_id)
            .await?;
        if !responsible {
            return Err(AppError::AccessDenied);
        }

        let tender = NewTender {
            status: TenderStatus::Created,
            ..tender
        };
        self.store.create(tender).await
    }

    /// Public tender listing, newest first, optionally filtered by
    /// service type. An empty page is reported as `TenderNotFound`.
    pub async fn list(&self, service_types: &[String], page: Page) -> AppResult<Vec<Tender>> {
        let tenders = self.store.list(service_types, page).await?;
        if tenders.is_empty() {
            return Err(AppError::TenderNotFound);
        }
        Ok(tenders)
    }

    /// Tenders created by the given user, newest first. An unknown
    /// username simply produces an empty page, which is `TenderNotFound`.
    pub async fn list_by_creator(&self, username: &str, page: Page) -> AppResult<Vec<Tender>> {
        let tenders = self.store.list_by_creator(username, page).await?;
        if tenders.is_empty() {
            return Err(AppError::TenderNotFound);
        }
        Ok(tenders)
    }

    /// Partial update of title/description/status by the creator.
    ///
    /// The version is bumped even when no optional field was supplied.
    pub async fn update(
        &self,
        id: Uuid,
        username: &str,
        patch: TenderPatch,
    ) -> AppResult<Tender> {
        let patch = patch.normalize();
        if let Some(ref status) = patch.status {
            let next = self.parse_status(status)?;
            self.check_transition(id, next).await?;
        }
        self.store.update(id, username, patch).await
    }

    pub async fn status(&self, id: Uuid) -> AppResult<TenderStatus> {
        self.store.status(id).await
    }

    /// Overwrite the tender status. Creator-only, version bumps.
    pub async fn update_status(
        &self,
        id: Uuid,
        username: &str,
        status: &str,
    ) -> AppResult<Tender> {
        let next = self.parse_status(status)?;
        self.check_transition(id, next).await?;
        self.store.update_status(id, username, next).await
    }

    fn parse_status(&self, status: &str) -> AppResult<TenderStatus> {
        TenderStatus::parse(status)
            .ok_or_else(|| AppError::unprocessable(format!("invalid tender status: {status:?}")))
    }

    async fn check_transition(&self, id: Uuid, next: TenderStatus) -> AppResult<()> {
        if !self.policy.enforce_status_transitions {
            return Ok(());
        }
        let current = self.store.status(id).await?;
        if !current.can_transition_to(next) {
            return Err(AppError::unprocessable(format!(
                "tender status cannot move from {current} to {next}"
            )));
        }
        Ok(())
    }
}
