//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, address parses)
//! - Reject configurations that would make login impossible
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, CredentialsConfig};

/// Longest accepted token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("auth.jwt_secret must not be empty")]
    EmptySecret,

    #[error("auth.token_ttl_secs must be greater than zero")]
    ZeroTokenTtl,

    #[error("auth.token_ttl_secs {0} exceeds the maximum of {max}", max = MAX_TOKEN_TTL_SECS)]
    TokenTtlTooLarge(u64),

    #[error("auth.credentials static username must not be empty")]
    EmptyStaticUsername,

    #[error("audit.database_url must not be empty")]
    EmptyDatabaseUrl,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if config.auth.token_ttl_secs == 0 {
        errors.push(ValidationError::ZeroTokenTtl);
    } else if config.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
        errors.push(ValidationError::TokenTtlTooLarge(config.auth.token_ttl_secs));
    }
    if let CredentialsConfig::Static { username, .. } = &config.auth.credentials {
        if username.is_empty() {
            errors.push(ValidationError::EmptyStaticUsername);
        }
    }

    if config.audit.database_url.is_empty() {
        errors.push(ValidationError::EmptyDatabaseUrl);
    }
    if config.audit.write_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("audit.write_timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
