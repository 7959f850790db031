//! HTTP surface of the math service.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (trace, request ID, security headers)
//!     → middleware.rs (recovery, metrics)
//!     → timeout / body limit
//!     → auth::require_bearer (protected routes only)
//!     → extract.rs (JSON body decoding)
//!     → handlers.rs (compute, audit, respond)
//!     → error.rs (uniform `{"error": ...}` bodies)
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use error::AppError;
pub use server::{build_router, AppState, HttpServer, RouterOptions, X_REQUEST_ID};
