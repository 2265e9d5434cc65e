//! Business logic services
//!
//! The lifecycle services own authorization and validation; storage is
//! reached only through the gateway traits in [`crate::db::store`].

pub mod bids;
pub mod tenders;

pub use bids::BidService;
pub use tenders::TenderService;
