//! Procura library
//!
//! Backend for publishing procurement tenders and collecting bids on
//! them. This crate wires the HTTP API, the lifecycle services, and the
//! SQLite-backed repositories together; the binary in `main.rs` only
//! does process bootstrap.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
use db::{BidRepository, TenderRepository};
use services::{BidService, TenderService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Database connection pool
    pub db: DbPool,
    /// Tender lifecycle service
    pub tenders: Arc<TenderService>,
    /// Bid lifecycle service
    pub bids: Arc<BidService>,
}

impl AppState {
    /// Wire the services onto a connected pool.
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let tenders = Arc::new(TenderService::new(
            Arc::new(TenderRepository::new(db.clone())),
            config.policy.clone(),
        ));
        let bids = Arc::new(BidService::new(
            Arc::new(BidRepository::new(db.clone())),
            config.policy.clone(),
        ));
        Self {
            config: Arc::new(config),
            db,
            tenders,
            bids,
        }
    }
}
