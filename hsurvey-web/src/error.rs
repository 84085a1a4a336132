//! Error types for hsurvey-web handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::report::ReportError;
use crate::submission::ValidationError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed form input (400)
    #[error("Invalid submission: {0}")]
    Validation(#[from] ValidationError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Store failure that no tier could absorb
    #[error("Storage error: {0}")]
    Common(#[from] hsurvey_common::Error),

    /// Summary export failure
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Common(_) | ApiError::Report(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
