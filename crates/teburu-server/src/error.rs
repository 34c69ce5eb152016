//! HTTP error mapping
//!
//! Every failure is answered with a body that is a single JSON string holding
//! the error text. Upstream failures that are likely to clear on their own
//! (connection, timeout, 5xx, 429) are 502; everything else is 400.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use teburu_core::CoreError;
use teburu_sheets::SheetsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Fetch(#[from] SheetsError),

    #[error("invalid path {0:?}")]
    InvalidPath(String),

    #[error("invalid row {0:?}: must be a positive integer")]
    InvalidRow(String),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Fetch(e) if e.is_transient() => StatusCode::BAD_GATEWAY,
            AppError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Text sent to the client. Upstream errors are sanitized.
    pub fn message(&self) -> String {
        match self {
            AppError::Fetch(e) => e.sanitized_message(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Fetch(e) => tracing::warn!(
                category = ?e.category(),
                "sheet fetch failed: {}",
                e.sanitized_message()
            ),
            AppError::Encode(e) => tracing::error!("{}", e),
            _ => tracing::debug!("bad request: {}", self),
        }
        (self.status(), Json(self.message())).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
