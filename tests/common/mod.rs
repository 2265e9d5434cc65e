//! Common test utilities and helpers
//!
//! Shared infrastructure for the integration suite: the in-process
//! test application and direct seeding of reference data.

pub mod seed;

pub use seed::*;
pub use test_app::*;
