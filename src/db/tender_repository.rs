//! Tender repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::store::TenderStore;
use crate::db::{fmt_db_timestamp, parse_db_timestamp};
use crate::models::{NewTender, Page, Tender, TenderPatch, TenderStatus};
use crate::utils::{AppError, AppResult};

const TENDER_COLUMNS: &str = "id, organization_id, title, description, service_type, status, \
                              version, created_at, updated_at, creator_username";

#[derive(Debug, sqlx::FromRow)]
struct TenderRow {
    id: String,
    organization_id: String,
    title: String,
    description: String,
    service_type: String,
    status: String,
    version: i64,
    created_at: String,
    updated_at: String,
    creator_username: String,
}

impl TenderRow {
    fn into_tender(self) -> AppResult<Tender> {
        let status = TenderStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "tender {} has unrecognized status {:?}",
                self.id,
                self.status
            ))
        })?;
        Ok(Tender {
            id: Uuid::parse_str(&self.id).unwrap_or_else(|_| Uuid::nil()),
            organization_id: Uuid::parse_str(&self.organization_id)
                .unwrap_or_else(|_| Uuid::nil()),
            title: self.title,
            description: self.description,
            service_type: self.service_type,
            status,
            version: self.version,
            created_at: parse_db_timestamp(&self.created_at),
            updated_at: parse_db_timestamp(&self.updated_at),
            creator_username: self.creator_username,
        })
    }
}

pub struct TenderRepository {
    pool: SqlitePool,
}

impl TenderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenderStore for TenderRepository {
    async fn create(&self, tender: NewTender) -> AppResult<Tender> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let ts = fmt_db_timestamp(now);

        sqlx::query(
            r#"
            INSERT INTO tender
                (id, organization_id, title, description, service_type, status,
                 version, created_at, updated_at, creator_username)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(tender.organization_id.to_string())
        .bind(&tender.title)
        .bind(&tender.description)
        .bind(&tender.service_type)
        .bind(tender.status.as_str())
        .bind(&ts)
        .bind(&ts)
        .bind(&tender.creator_username)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::TenderAlreadyExists
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(Tender {
            id,
            organization_id: tender.organization_id,
            title: tender.title,
            description: tender.description,
            service_type: tender.service_type,
            status: tender.status,
            version: 1,
            created_at: now,
            updated_at: now,
            creator_username: tender.creator_username,
        })
    }

    async fn list(&self, service_types: &[String], page: Page) -> AppResult<Vec<Tender>> {
        // IN-lists cannot be bound as a single parameter in SQLite, so the
        // placeholder list is built to match the filter length.
        let mut sql = format!("SELECT {TENDER_COLUMNS} FROM tender");
        if !service_types.is_empty() {
            let placeholders = vec!["?"; service_types.len()].join(", ");
            sql.push_str(&format!(" WHERE service_type IN ({placeholders})"));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, TenderRow>(&sql);
        for service_type in service_types {
            query = query.bind(service_type);
        }
        let rows = query
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TenderRow::into_tender).collect()
    }

    async fn list_by_creator(&self, username: &str, page: Page) -> AppResult<Vec<Tender>> {
        let sql = format!(
            "SELECT {TENDER_COLUMNS} FROM tender WHERE creator_username = ? \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, TenderRow>(&sql)
            .bind(username)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TenderRow::into_tender).collect()
    }

    async fn update(&self, id: Uuid, username: &str, patch: TenderPatch) -> AppResult<Tender> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {TENDER_COLUMNS} FROM tender WHERE id = ?");
        let row: Option<TenderRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(AppError::TenderNotFound);
        };
        if row.creator_username != username {
            return Err(AppError::AccessDenied);
        }

        let title = patch.title.unwrap_or(row.title);
        let description = patch.description.unwrap_or(row.description);
        let status_str = patch.status.unwrap_or(row.status);
        let status = TenderStatus::parse(&status_str)
            .ok_or_else(|| AppError::unprocessable(format!("invalid tender status: {status_str:?}")))?;
        let version = row.version + 1;
        let updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE tender
            SET title = ?, description = ?, status = ?, version = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&description)
        .bind(status.as_str())
        .bind(version)
        .bind(fmt_db_timestamp(updated_at))
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Tender {
            id,
            organization_id: Uuid::parse_str(&row.organization_id)
                .unwrap_or_else(|_| Uuid::nil()),
            title,
            description,
            service_type: row.service_type,
            status,
            version,
            created_at: parse_db_timestamp(&row.created_at),
            updated_at,
            creator_username: row.creator_username,
        })
    }

    async fn status(&self, id: Uuid) -> AppResult<TenderStatus> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM tender WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        let status = status.ok_or(AppError::TenderNotFound)?;
        TenderStatus::parse(&status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "tender {id} has unrecognized status {status:?}"
            ))
        })
    }

    async fn update_status(
        &self,
        id: Uuid,
        username: &str,
        status: TenderStatus,
    ) -> AppResult<Tender> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {TENDER_COLUMNS} FROM tender WHERE id = ?");
        let row: Option<TenderRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(AppError::TenderNotFound);
        };
        if row.creator_username != username {
            return Err(AppError::AccessDenied);
        }

        let version = row.version + 1;
        let updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE tender
            SET status = ?, creator_username = ?, version = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(username)
        .bind(version)
        .bind(fmt_db_timestamp(updated_at))
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Tender {
            id,
            organization_id: Uuid::parse_str(&row.organization_id)
                .unwrap_or_else(|_| Uuid::nil()),
            title: row.title,
            description: row.description,
            service_type: row.service_type,
            status,
            version,
            created_at: parse_db_timestamp(&row.created_at),
            updated_at,
            creator_username: username.to_string(),
        })
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
}
