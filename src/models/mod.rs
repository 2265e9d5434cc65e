//! Data models

mod bid;
mod organization;
mod tender;

pub use bid::*;
pub use organization::*;
pub use tender::*;

/// Pagination window for list queries. Defaults match the public API
/// contract: limit 5, offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 5, offset: 0 }
    }
}
