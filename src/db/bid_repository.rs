//! Bid repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::store::BidStore;
use crate::db::{fmt_db_timestamp, parse_db_timestamp};
use crate::models::{Bid, BidDecision, BidPatch, BidStatus, NewBid, Page};
use crate::utils::{AppError, AppResult};

const BID_COLUMNS: &str = "id, tender_id, organization_id, title, description, status, \
                           decision, version, created_at, updated_at, creator_username";

#[derive(Debug, sqlx::FromRow)]
struct BidRow {
    id: String,
    tender_id: String,
    organization_id: String,
    title: String,
    description: String,
    status: String,
    decision: Option<String>,
    version: i64,
    created_at: String,
    updated_at: String,
    creator_username: String,
}

impl BidRow {
    fn into_bid(self) -> AppResult<Bid> {
        let status = BidStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "bid {} has unrecognized status {:?}",
                self.id,
                self.status
            ))
        })?;
        let decision = self
            .decision
            .as_deref()
            .map(|d| {
                BidDecision::parse(d).ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!(
                        "bid {} has unrecognized decision {:?}",
                        self.id,
                        d
                    ))
                })
            })
            .transpose()?;
        Ok(Bid {
            id: Uuid::parse_str(&self.id).unwrap_or_else(|_| Uuid::nil()),
            tender_id: Uuid::parse_str(&self.tender_id).unwrap_or_else(|_| Uuid::nil()),
            organization_id: Uuid::parse_str(&self.organization_id)
                .unwrap_or_else(|_| Uuid::nil()),
            title: self.title,
            description: self.description,
            status,
            decision,
            version: self.version,
            created_at: parse_db_timestamp(&self.created_at),
            updated_at: parse_db_timestamp(&self.updated_at),
            creator_username: self.creator_username,
        })
    }
}

pub struct BidRepository {
    pool: SqlitePool,
}

impl BidRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_scoped(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: Uuid,
        username: &str,
    ) -> AppResult<BidRow> {
        let sql = format!("SELECT {BID_COLUMNS} FROM bids WHERE id = ? AND creator_username = ?");
        let row: Option<BidRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .bind(username)
            .fetch_optional(&mut **tx)
            .await?;
        row.ok_or(AppError::BidNotFound)
    }
}

#[async_trait]
impl BidStore for BidRepository {
    async fn create(&self, bid: NewBid) -> AppResult<Bid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let ts = fmt_db_timestamp(now);

        sqlx::query(
            r#"
            INSERT INTO bids
                (id, tender_id, organization_id, title, description, status,
                 version, created_at, updated_at, creator_username)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(bid.tender_id.to_string())
        .bind(bid.organization_id.to_string())
        .bind(&bid.title)
        .bind(&bid.description)
        .bind(bid.status.as_str())
        .bind(&ts)
        .bind(&ts)
        .bind(&bid.creator_username)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::BidAlreadyExists
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(Bid {
            id,
            tender_id: bid.tender_id,
            organization_id: bid.organization_id,
            title: bid.title,
            description: bid.description,
            status: bid.status,
            decision: None,
            version: 1,
            created_at: now,
            updated_at: now,
            creator_username: bid.creator_username,
        })
    }

    async fn list_by_creator(&self, username: &str, page: Page) -> AppResult<Vec<Bid>> {
        let sql = format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE creator_username = ? \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, BidRow>(&sql)
            .bind(username)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(BidRow::into_bid).collect()
    }

    async fn list_by_tender(
        &self,
        tender_id: Uuid,
        username: &str,
        page: Page,
    ) -> AppResult<Vec<Bid>> {
        let sql = format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE tender_id = ? AND creator_username = ? \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, BidRow>(&sql)
            .bind(tender_id.to_string())
            .bind(username)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(BidRow::into_bid).collect()
    }

    async fn update(&self, id: Uuid, username: &str, patch: BidPatch) -> AppResult<Bid> {
        let mut tx = self.pool.begin().await?;
        let mut row = self.fetch_scoped(&mut tx, id, username).await?;

        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        row.version += 1;
        row.updated_at = fmt_db_timestamp(Utc::now());

        sqlx::query(
            r#"
            UPDATE bids
            SET title = ?, description = ?, version = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.title)
        .bind(&row.description)
        .bind(row.version)
        .bind(&row.updated_at)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_bid()
    }

    async fn status(&self, id: Uuid, username: &str) -> AppResult<BidStatus> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM bids WHERE id = ? AND creator_username = ?")
                .bind(id.to_string())
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        let status = status.ok_or(AppError::BidNotFound)?;
        BidStatus::parse(&status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "bid {id} has unrecognized status {status:?}"
            ))
        })
    }

    async fn update_status(&self, id: Uuid, username: &str, status: BidStatus) -> AppResult<Bid> {
        let mut tx = self.pool.begin().await?;
        let mut row = self.fetch_scoped(&mut tx, id, username).await?;

        // The bid version counter tracks content edits only; a status
        // flip refreshes updated_at but leaves version alone.
        row.status = status.as_str().to_string();
        row.updated_at = fmt_db_timestamp(Utc::now());

        sqlx::query("UPDATE bids SET status = ?, updated_at = ? WHERE id = ?")
            .bind(&row.status)
            .bind(&row.updated_at)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.into_bid()
    }

    async fn update_decision(
        &self,
        id: Uuid,
        username: &str,
        decision: BidDecision,
    ) -> AppResult<Bid> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {BID_COLUMNS} FROM bids WHERE id = ?");
        let row: Option<BidRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut row) = row else {
            return Err(AppError::BidNotFound);
        };
        if row.creator_username != username {
            return Err(AppError::AccessDenied);
        }

        // The decision is terminal metadata; it does not count as an edit,
        // so neither version nor updated_at moves.
        row.decision = Some(decision.as_str().to_string());

        sqlx::query("UPDATE bids SET decision = ? WHERE id = ?")
            .bind(decision.as_str())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.into_bid()
    }

    async fn is_user_authorized_to_bid(
        &self,
        username: &str,
        organization_id: Uuid,
    ) -> AppResult<bool> {
        // Deliberately permissive: a responsibility link OR mere existence
        // as an employee is enough. The strict_bid_authorization policy
        // flag routes around this via is_user_responsible instead.
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*)
                 FROM organization_responsible
                 WHERE user_id = (SELECT id FROM employee WHERE username = ?)
                   AND organization_id = ?)
              + (SELECT COUNT(*) FROM employee WHERE username = ?)
            "#,
        )
        .bind(username)
        .bind(organization_id.to_string())
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn is_user_responsible(&self, username: &str, organization_id: Uuid) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM organization_responsible
            WHERE user_id = (SELECT id FROM employee WHERE username = ?)
              AND organization_id = ?
            "#,
        )
        .bind(username)
        .bind(organization_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn is_tender_valid(&self, tender_id: Uuid) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tender WHERE id = ? AND status <> 'Canceled'",
        )
        .bind(tender_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn user_exists(&self, username: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employee WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}
