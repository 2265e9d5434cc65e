//! Database layer
//!
//! SQLite-backed storage for the procurement entities:
//! - Tenders and their lifecycle state
//! - Bids, including terminal decisions
//! - The organization/employee reference graph used for authorization
//!
//! The lifecycle services talk to this layer only through the traits in
//! [`store`]; the concrete repositories here implement them with sqlx.

pub mod bid_repository;
pub mod store;
pub mod tender_repository;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::time::Duration;

use crate::config::DatabaseConfig;

pub use bid_repository::BidRepository;
pub use store::{BidStore, TenderStore};
pub use tender_repository::TenderRepository;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", config.url))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Format a timestamp for storage.
///
/// Fixed-width RFC 3339 with microsecond precision, so that TEXT
/// comparison of two stored timestamps matches chronological order.
/// The `ORDER BY created_at DESC` pagination queries depend on this.
pub(crate) fn fmt_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}
