//! Route handlers.
//!
//! Each arithmetic handler decodes its body, validates preconditions,
//! computes, hands an `OperationRecord` to the audit log and answers
//! `{"result": ...}`. Validation failures produce no audit record.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;

use crate::audit::OperationRecord;
use crate::auth::AuthenticatedUser;
use crate::http::error::AppError;
use crate::http::extract::ApiJson;
use crate::http::server::AppState;
use crate::math;

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of `/multiply` and `/divide`.
#[derive(Debug, Deserialize)]
pub struct BinaryRequest {
    #[serde(rename = "A", alias = "a", default)]
    pub a: f64,
    #[serde(rename = "B", alias = "b", default)]
    pub b: f64,
}

/// Body of `/factorial`.
#[derive(Debug, Deserialize)]
pub struct FactorialRequest {
    #[serde(rename = "N", alias = "n", default)]
    pub n: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultResponse<T> {
    pub result: T,
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if !state.credentials.verify(&req.username, &req.password).await? {
        tracing::info!(username = %req.username, "Login rejected");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.tokens.issue(&req.username)?;
    tracing::info!(username = %req.username, "Token issued");
    Ok(Json(TokenResponse { token }))
}

/// `POST /multiply`
pub async fn multiply(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<BinaryRequest>,
) -> Json<ResultResponse<f64>> {
    let result = math::multiply(req.a, req.b);
    tracing::debug!(user = %user.username, a = req.a, b = req.b, result, "multiply");

    state.audit.record(OperationRecord::multiply(req.a, req.b, result));
    Json(ResultResponse { result })
}

/// `POST /divide`
pub async fn divide(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<BinaryRequest>,
) -> Result<Json<ResultResponse<f64>>, AppError> {
    let result = math::divide(req.a, req.b)?;
    tracing::debug!(user = %user.username, a = req.a, b = req.b, result, "divide");

    state.audit.record(OperationRecord::divide(req.a, req.b, result));
    Ok(Json(ResultResponse { result }))
}

/// `POST /factorial`
///
/// The result is a decimal string so no precision is lost in JSON. The
/// computation runs on the blocking pool so the request deadline still applies.
pub async fn factorial(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<FactorialRequest>,
) -> Result<Json<ResultResponse<String>>, AppError> {
    let n = u64::try_from(req.n)
        .map_err(|_| AppError::Validation("n must be non-negative".to_string()))?;

    let result = spawn_blocking(move || math::factorial(n).to_string()).await?;
    tracing::debug!(user = %user.username, n, digits = result.len(), "factorial");

    state
        .audit
        .record(OperationRecord::factorial(req.n, result.clone()));
    Ok(Json(ResultResponse { result }))
}

/// `GET /metrics`
pub async fn metrics_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}

/// Fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
