//! Query/path parameter plumbing shared by the API handlers
//!
//! The public contract carries pagination and caller identity in the
//! query string, so handlers take them as raw strings and validate here.
//! That keeps malformed input on the standard error envelope instead of
//! an extractor rejection.

use uuid::Uuid;

use crate::models::Page;
use crate::utils::{AppError, AppResult};

/// Parse `limit`/`offset` with the API defaults (5 and 0). An empty
/// string counts as unset; unparseable or negative values are a 400.
pub(super) fn parse_page(limit: Option<&str>, offset: Option<&str>) -> AppResult<Page> {
    let mut page = Page::default();
    if let Some(limit) = limit.filter(|s| !s.is_empty()) {
        page.limit = limit
            .parse()
            .map_err(|_| AppError::bad_request("Invalid limit parameter"))?;
        if page.limit < 0 {
            return Err(AppError::bad_request("Invalid limit parameter"));
        }
    }
    if let Some(offset) = offset.filter(|s| !s.is_empty()) {
        page.offset = offset
            .parse()
            .map_err(|_| AppError::bad_request("Invalid offset parameter"))?;
        if page.offset < 0 {
            return Err(AppError::bad_request("Invalid offset parameter"));
        }
    }
    Ok(page)
}

/// A username that must be present and non-empty.
pub(super) fn require_username(username: Option<String>) -> AppResult<String> {
    username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing username parameter"))
}

/// Path segments arrive as plain strings; a malformed UUID is a 400.
pub(super) fn parse_uuid(raw: &str, name: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("Invalid {name} format")))
}
