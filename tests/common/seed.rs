//! Reference-data seeding
//!
//! Organizations, employees, and responsibility links have no API
//! surface, so tests insert them straight into the database. Timestamps
//! use the same fixed-width RFC 3339 form the repositories write.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use procura::DbPool;

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub async fn seed_organization(db: &DbPool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let ts = now();
    sqlx::query(
        "INSERT INTO organization (id, name, description, org_type, created_at, updated_at)
         VALUES (?, ?, '', 'LLC', ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(&ts)
    .bind(&ts)
    .execute(db)
    .await
    .expect("Failed to seed organization");
    id
}

pub async fn seed_employee(db: &DbPool, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    let ts = now();
    sqlx::query(
        "INSERT INTO employee (id, username, first_name, last_name, created_at, updated_at)
         VALUES (?, ?, '', '', ?, ?)",
    )
    .bind(id.to_string())
    .bind(username)
    .bind(&ts)
    .bind(&ts)
    .execute(db)
    .await
    .expect("Failed to seed employee");
    id
}

pub async fn link_responsible(db: &DbPool, organization_id: Uuid, user_id: Uuid) {
    sqlx::query(
        "INSERT INTO organization_responsible (id, organization_id, user_id) VALUES (?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(organization_id.to_string())
    .bind(user_id.to_string())
    .execute(db)
    .await
    .expect("Failed to seed organization responsible");
}

/// An organization with one employee registered as its responsible.
/// Returns `(organization_id, username)`.
pub async fn seed_org_with_responsible(db: &DbPool, name: &str, username: &str) -> (Uuid, String) {
    let org = seed_organization(db, name).await;
    let user = seed_employee(db, username).await;
    link_responsible(db, org, user).await;
    (org, username.to_string())
}

/// Insert a tender row directly, for states the API cannot produce
/// (for example a legacy `Canceled` status).
pub async fn seed_tender_row(
    db: &DbPool,
    organization_id: Uuid,
    title: &str,
    status: &str,
    creator_username: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    let ts = now();
    sqlx::query(
        "INSERT INTO tender (id, organization_id, title, description, service_type, status,
                             version, created_at, updated_at, creator_username)
         VALUES (?, ?, ?, '', 'General', ?, 1, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(organization_id.to_string())
    .bind(title)
    .bind(status)
    .bind(&ts)
    .bind(&ts)
    .bind(creator_username)
    .execute(db)
    .await
    .expect("Failed to seed tender row");
    id
}

pub async fn count_rows(db: &DbPool, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    sqlx::query_scalar(&sql)
        .fetch_one(db)
        .await
        .expect("Failed to count rows")
}
