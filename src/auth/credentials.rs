//! Login credential checking.
//!
//! # Responsibilities
//! - Decide whether a username/password pair may log in
//! - Keep the decision behind a trait so the backing store can change
//!   without touching token issuance
//!
//! # Design Decisions
//! - `StaticCredentials` holds one fixed pair (development and tests)
//! - `SqliteCredentials` checks bcrypt hashes in a `users` table; hashing
//!   runs on the blocking pool
//! - A store failure is an error, never an implicit "denied"

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use thiserror::Error;
use tokio::task::spawn_blocking;

/// Failure to reach a decision about a credential pair.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password hash task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Strategy deciding whether a login attempt is authenticated.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns `Ok(true)` when `password` is correct for `username`.
    async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError>;
}

/// A single fixed username/password pair.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        Ok(username == self.username && password == self.password)
    }
}

/// Users stored in SQLite with bcrypt password hashes.
#[derive(Clone)]
pub struct SqliteCredentials {
    pool: SqlitePool,
    hash_cost: u32,
}

impl SqliteCredentials {
    /// Connect to `url` and make sure the `users` table exists.
    pub async fn connect(url: &str) -> Result<Self, CredentialError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 4 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Use an existing pool, creating the `users` table if needed.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, CredentialError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self {
            pool,
            hash_cost: bcrypt::DEFAULT_COST,
        })
    }

    /// Override the bcrypt cost used by [`Self::add_user`].
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Create or replace a user.
    pub async fn add_user(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let password = password.to_owned();
        let cost = self.hash_cost;
        let password_hash = spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        sqlx::query(
            "INSERT INTO users (username, password_hash) VALUES (?, ?)
             ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialVerifier for SqliteCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match hash {
            Some(hash) => {
                let password = password.to_owned();
                Ok(spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
            }
            None => Ok(false),
        }
    }
}
