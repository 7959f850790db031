//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /login:
//!     credentials.rs (CredentialVerifier decides)
//!     → token.rs (TokenService::issue)
//!     → {"token": "..."}
//!
//! Protected routes:
//!     middleware.rs (extract Bearer token)
//!     → token.rs (TokenService::verify)
//!     → AuthenticatedUser in request extensions
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Signing secret is read once at startup and never logged
//! - Credential checking is a strategy, independent of token issuance
//! - Every auth failure is a 401; the reason is only logged

pub mod credentials;
pub mod middleware;
pub mod token;

pub use credentials::{CredentialError, CredentialVerifier, SqliteCredentials, StaticCredentials};
pub use middleware::{require_bearer, AuthenticatedUser};
pub use token::{Claims, TokenError, TokenService};
