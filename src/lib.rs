//! Authenticated arithmetic HTTP service.
//!
//! Multiplication, division and arbitrary-precision factorial behind
//! bearer-token auth, with a best-effort audit log of every successful
//! operation and Prometheus request metrics.

// Core domain
pub mod math;

// Request surface
pub mod auth;
pub mod http;

// Persistence
pub mod audit;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
