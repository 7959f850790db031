//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize all subsystems in dependency order
//! - Select the audit backend and credential strategy from config
//! - Produce the [`AppState`] shared by every request
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The listener is bound by the caller, after state is ready

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::audit::{AuditError, AuditLog, AuditStore, MemoryAuditStore, SqliteAuditStore};
use crate::auth::{CredentialError, CredentialVerifier, SqliteCredentials, StaticCredentials, TokenService};
use crate::config::{AppConfig, AuditBackend, CredentialsConfig};
use crate::http::AppState;
use crate::observability::MetricsCollector;

/// Error type for startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Metrics recorder error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Audit store error: {0}")]
    Audit(#[from] AuditError),

    #[error("Credential store error: {0}")]
    Credentials(#[from] CredentialError),
}

/// Build the shared request state from a validated configuration.
pub async fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let metrics = MetricsCollector::new()?;

    let store: Arc<dyn AuditStore> = match config.audit.backend {
        AuditBackend::Sqlite => {
            let store = SqliteAuditStore::connect(&config.audit.database_url).await?;
            tracing::info!(backend = "sqlite", "Audit store ready");
            Arc::new(store)
        }
        AuditBackend::Memory => {
            tracing::info!(backend = "memory", "Audit store ready");
            Arc::new(MemoryAuditStore::new())
        }
    };
    let audit = AuditLog::new(
        store,
        Duration::from_millis(config.audit.write_timeout_ms),
        metrics.clone(),
    );

    let credentials = build_credentials(config).await?;

    let tokens = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        Duration::from_secs(config.auth.token_ttl_secs),
    ));

    Ok(AppState {
        tokens,
        credentials,
        audit,
        metrics,
    })
}

/// Connect the configured credential store.
pub async fn build_credentials(
    config: &AppConfig,
) -> Result<Arc<dyn CredentialVerifier>, CredentialError> {
    match &config.auth.credentials {
        CredentialsConfig::Static { username, password } => {
            tracing::info!(mode = "static", username = %username, "Credential strategy ready");
            Ok(Arc::new(StaticCredentials::new(username.clone(), password.clone())))
        }
        CredentialsConfig::Database { .. } => {
            let store = connect_user_store(config).await?;
            tracing::info!(mode = "database", "Credential strategy ready");
            Ok(Arc::new(store))
        }
    }
}

/// Open the users table, whatever the configured credential mode.
///
/// Used by `add-user`, which manages the table even while the server runs
/// in static mode.
pub async fn connect_user_store(config: &AppConfig) -> Result<SqliteCredentials, CredentialError> {
    let url = match &config.auth.credentials {
        CredentialsConfig::Database {
            database_url: Some(url),
        } => url.as_str(),
        _ => config.audit.database_url.as_str(),
    };
    SqliteCredentials::connect(url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.audit.backend = AuditBackend::Memory;
        config
    }

    #[tokio::test]
    async fn test_default_credentials_are_static() {
        let state = build_state(&memory_config()).await.unwrap();
        assert!(state.credentials.verify("admin", "password").await.unwrap());
        assert!(!state.credentials.verify("admin", "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_token_service_uses_configured_secret() {
        let mut config = memory_config();
        config.auth.jwt_secret = "configured-secret".to_string();
        let state = build_state(&config).await.unwrap();

        let token = state.tokens.issue("admin").unwrap();
        let other = TokenService::new("configured-secret", Duration::from_secs(60));
        assert_eq!(other.verify(&token).unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_database_credentials() {
        let mut config = memory_config();
        config.auth.credentials = CredentialsConfig::Database {
            database_url: Some("sqlite::memory:".to_string()),
        };
        let state = build_state(&config).await.unwrap();

        // Fresh database has no users.
        assert!(!state.credentials.verify("admin", "password").await.unwrap());
    }

    #[tokio::test]
    async fn test_user_store_falls_back_to_audit_url() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("shared.db").display());

        let mut config = AppConfig::default();
        config.audit.database_url = url;
        config.auth.credentials = CredentialsConfig::Database { database_url: None };

        let users = connect_user_store(&config).await.unwrap().with_hash_cost(4);
        users.add_user("carol", "pw").await.unwrap();

        let state = build_state(&config).await.unwrap();
        assert!(state.credentials.verify("carol", "pw").await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_audit_database_fails_startup() {
        let mut config = AppConfig::default();
        config.audit.database_url = "sqlite:///nonexistent-dir/audit.db?mode=ro".to_string();

        let err = build_state(&config).await.err().unwrap();
        assert!(matches!(err, StartupError::Audit(_)));
    }
}
