//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs whose payload carries the username and an absolute
//! expiry (`exp`, unix seconds). There is no revocation; a token is valid
//! until it expires.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Expiry as seconds since the unix epoch.
    pub exp: i64,
}

/// Reasons a token cannot be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies signed bearer tokens with a process-wide secret.
///
/// The secret is captured once at construction and only ever read.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenService {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Create a service signing with `secret`; tokens live for `ttl`.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Issue a token for `username` expiring one TTL from now.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?
            .timestamp();

        let claims = Claims {
            username: username.to_string(),
            exp,
        };

        encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry is checked below against the supplied clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Self::ALGORITHM)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TEST_SECRET: &str = "unit-test-secret";
    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn service() -> TokenService {
        TokenService::new(TEST_SECRET, DAY)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service();
        let token = tokens.issue("admin").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.username, "admin");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_expiry_is_one_day_after_issue() {
        let tokens = service();
        let issued = at(1_700_000_000);
        let token = tokens.issue_at("admin", issued).unwrap();

        let claims = tokens.verify_at(&token, issued).unwrap();
        assert_eq!(claims.exp, 1_700_000_000 + 86_400);
    }

    #[test]
    fn test_rejected_after_window() {
        let tokens = service();
        let issued = at(1_700_000_000);
        let token = tokens.issue_at("admin", issued).unwrap();

        // Still valid at the last second of the window.
        assert!(tokens.verify_at(&token, at(1_700_000_000 + 86_400)).is_ok());
        assert_eq!(
            tokens.verify_at(&token, at(1_700_000_000 + 86_401)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_real_clock_rejects_old_token() {
        let tokens = service();
        let token = tokens
            .issue_at("admin", Utc::now() - chrono::Duration::days(2))
            .unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let tokens = service();
        let now = at(1_700_000_000);
        let a = tokens.issue_at("admin", now).unwrap();
        let b = tokens.issue_at("admin", now).unwrap();
        assert_eq!(a, b);

        let later = tokens.issue_at("admin", at(1_700_000_001)).unwrap();
        assert_ne!(a, later);
    }

    #[test]
    fn test_wrong_secret() {
        let token = service().issue("admin").unwrap();
        let other = TokenService::new("another-secret", DAY);
        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload() {
        let tokens = service();
        let token = tokens.issue("admin").unwrap();
        let forged = tokens.issue("mallory").unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let spliced = parts.join(".");

        assert_eq!(tokens.verify(&spliced), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_malformed() {
        let tokens = service();
        for bad in ["", "abc", "...", "not.a.jwt"] {
            assert_eq!(tokens.verify(bad), Err(TokenError::Malformed), "input {:?}", bad);
        }
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = Claims {
            username: "admin".into(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains(TEST_SECRET));
        assert!(rendered.contains("HS256"));
    }
}
