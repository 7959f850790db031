//! Recovery and metrics stages of the request pipeline.

use std::any::Any;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{header, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use serde_json::json;

use crate::http::error::INTERNAL_ERROR_MESSAGE;
use crate::observability::metrics::MetricsCollector;

/// Path label used for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Convert a panic raised downstream into a generic 500.
///
/// Used with `CatchPanicLayer::custom`; the serving process keeps running.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    let body = json!({ "error": INTERNAL_ERROR_MESSAGE }).to_string();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}

/// Time the downstream stages and report method, route and status.
pub async fn track_metrics(
    State(metrics): State<MetricsCollector>,
    req: Request,
    next: Next,
) -> impl IntoResponse {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed = start.elapsed();
    metrics.observe(&method, &path, status, elapsed);

    tracing::debug!(
        method = %method,
        path = %path,
        status,
        duration_ms = elapsed.as_millis() as u64,
        "Request completed"
    );

    response
}
