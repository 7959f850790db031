//! Application error type and its HTTP mapping.
//!
//! Every error response carries a `{"error": "<message>"}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::credentials::CredentialError;
use crate::auth::token::TokenError;
use crate::math::MathError;

/// Message returned for any 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed body or violated precondition.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed or rejected credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// No route matched.
    #[error("not found")]
    NotFound,

    /// Unexpected failure; detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MathError> for AppError {
    fn from(err: MathError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) => AppError::Internal(err.to_string()),
            _ => AppError::Unauthorized("invalid or expired token".to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
