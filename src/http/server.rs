//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up the middleware pipeline (recovery, metrics, auth)
//! - Add ambient layers (tracing, request ID, limits, security headers)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::audit::AuditLog;
use crate::auth::{require_bearer, CredentialVerifier, TokenService};
use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::middleware::{handle_panic, track_metrics};
use crate::observability::metrics::MetricsCollector;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub audit: AuditLog,
    pub metrics: MetricsCollector,
}

/// Knobs for the ambient layers around the pipeline.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub request_timeout: Duration,
    pub max_body_size: usize,
    pub security_headers: bool,
}

impl From<&AppConfig> for RouterOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            max_body_size: config.security.max_body_size,
            security_headers: config.security.enable_headers,
        }
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Build the Axum router with all middleware layers.
///
/// Stage order, outermost first: trace → request ID → security headers →
/// recovery → metrics → timeout → body limit → auth (protected routes) → handler.
#[allow(deprecated)]
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let protected = Router::new()
        .route("/multiply", post(handlers::multiply))
        .route("/divide", post(handlers::divide))
        .route("/factorial", post(handlers::factorial))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_bearer,
        ));

    let router = Router::new()
        .route("/login", post(handlers::login))
        .route("/metrics", get(handlers::metrics_snapshot))
        .merge(protected)
        .fallback(handlers::not_found)
        .with_state(state.clone())
        .layer(RequestBodyLimitLayer::new(options.max_body_size))
        .layer(TimeoutLayer::new(options.request_timeout))
        .layer(middleware::from_fn_with_state(state.metrics, track_metrics))
        .layer(CatchPanicLayer::custom(handle_panic));

    let router = if options.security_headers {
        router
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ))
    } else {
        router
    };

    router
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get(&X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri().path(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}

/// HTTP server for the math API.
pub struct HttpServer {
    router: Router,
    shutdown_grace: Duration,
}

impl HttpServer {
    /// Create a new HTTP server from configuration and prepared state.
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        let router = build_router(state, &RouterOptions::from(config));
        Self {
            router,
            shutdown_grace: Duration::from_secs(config.timeouts.shutdown_grace_secs),
        }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let grace = self.shutdown_grace;
        let (drained_tx, drained_rx) = tokio::sync::oneshot::channel::<()>();

        let serve = axum::serve(listener, self.router).with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received, draining connections");
            let _ = drained_tx.send(());
        });

        tokio::select! {
            result = serve => result?,
            _ = async {
                let _ = drained_rx.await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(grace_secs = grace.as_secs(), "Drain deadline exceeded, forcing shutdown");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
