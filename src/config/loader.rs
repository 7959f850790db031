//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, CredentialsConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the SQLite connection string.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Environment variable overriding the token signing secret.
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file (if given), apply process environment overrides and validate.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    finalize(config, |name| std::env::var(name).ok())
}

/// Apply overrides from `lookup` and validate.
///
/// Split out from [`load_config`] so tests can supply the environment.
pub fn finalize<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_DATABASE_URL) {
        config.audit.database_url = url.clone();
        if let CredentialsConfig::Database { database_url } = &mut config.auth.credentials {
            database_url.get_or_insert(url);
        }
    }

    if let Some(secret) = lookup(ENV_JWT_SECRET) {
        config.auth.jwt_secret = secret;
    }

    if let Some(port) = lookup(ENV_PORT) {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            name: ENV_PORT,
            reason: format!("'{}' is not a port number", port),
        })?;
        let mut addr: SocketAddr =
            config
                .listener
                .bind_address
                .parse()
                .map_err(|_| ConfigError::Env {
                    name: ENV_PORT,
                    reason: format!(
                        "cannot apply to bind address '{}'",
                        config.listener.bind_address
                    ),
                })?;
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    Ok(())
}
