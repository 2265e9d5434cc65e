//! Error types and handling
//!
//! One error taxonomy for the whole service. Lifecycle services and
//! repositories return these kinds directly; the HTTP layer renders
//! them as a consistent JSON body with one status code per kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller lacks the required organizational or ownership
    /// relationship (403)
    #[error("access denied")]
    AccessDenied,

    /// No tender matches the identifier or scope, including an empty
    /// list page (404)
    #[error("tender not found")]
    TenderNotFound,

    /// No bid matches the identifier or ownership scope, including an
    /// empty list page (404)
    #[error("bid not found")]
    BidNotFound,

    /// No employee with the given username (404)
    #[error("user not found")]
    UserNotFound,

    /// Tender uniqueness constraint violated at the store (409)
    #[error("tender already exists")]
    TenderAlreadyExists,

    /// Bid uniqueness constraint violated at the store (409)
    #[error("bid already exists")]
    BidAlreadyExists,

    /// Caller-supplied status or decision outside the allowed set (422)
    #[error("unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// Malformed request input: bad identifiers, negative pagination (400)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unclassified storage failure (500)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other infrastructure failure (500)
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unprocessable(message: impl Into<String>) -> Self {
        AppError::UnprocessableEntity(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    /// HTTP status this kind renders as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::TenderNotFound | AppError::BidNotFound | AppError::UserNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::TenderAlreadyExists | AppError::BidAlreadyExists => StatusCode::CONFLICT,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::AccessDenied => "access_denied",
            AppError::TenderNotFound => "tender_not_found",
            AppError::BidNotFound => "bid_not_found",
            AppError::UserNotFound => "user_not_found",
            AppError::TenderAlreadyExists => "tender_already_exists",
            AppError::BidAlreadyExists => "bid_already_exists",
            AppError::UnprocessableEntity(_) => "unprocessable_entity",
            AppError::BadRequest(_) => "bad_request",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log server errors; client-side kinds stay quiet here.
        if status.is_server_error() {
            error!(error = %self, error_type = self.error_type(), "request failed");
        }

        let body = ErrorResponse::new(self.error_type(), self.to_string());

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
