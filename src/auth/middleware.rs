//! Bearer token authentication middleware.
//! Guards the arithmetic routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::token::TokenService;
use crate::http::error::AppError;

/// Identity attached to requests that passed authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Reject the request with 401 unless it carries a valid bearer token.
pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => value,
        None => {
            tracing::debug!(path = %req.uri().path(), "Missing Authorization header");
            return Err(AppError::Unauthorized("missing bearer token".to_string()));
        }
    };

    let token = header_value
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| {
            tracing::debug!(path = %req.uri().path(), "Malformed Authorization header");
            AppError::Unauthorized("malformed authorization header".to_string())
        })?;

    let claims = tokens.verify(token).map_err(|e| {
        tracing::debug!(path = %req.uri().path(), reason = %e, "Token rejected");
        AppError::from(e)
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        username: claims.username,
    });
    Ok(next.run(req).await)
}

/// Token part of `Bearer <token>`. The scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}
