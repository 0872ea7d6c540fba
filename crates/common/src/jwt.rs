//! JWT issuance and validation.
//!
//! Tokens are HS256-signed with the configured secret. Two token types exist:
//! short-lived `access` tokens authenticate API requests, `refresh` tokens can
//! only be exchanged for a new access token.
//!
//! Keys are held in an explicit [`JwtKeys`] value that is cloned into the
//! application state, never in a global.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::{AppError, AppResult};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token type carried in the claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Authenticates API requests.
    Access,
    /// Exchanged for a new access token.
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Username at issue time.
    pub username: String,
    /// Token type.
    pub token_type: TokenType,
    /// Unique token ID.
    pub jti: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Parse the subject as a user ID.
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub.parse().map_err(|_| AppError::Unauthorized)
    }
}

/// Access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Refresh token.
    pub refresh: String,
    /// Access token.
    pub access: String,
}

/// Signing and verification keys plus token lifetimes.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Create keys from a shared secret.
    #[must_use]
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Create keys from the auth section of the configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            Duration::seconds(config.access_token_ttl_secs),
            Duration::seconds(config.refresh_token_ttl_secs),
        )
    }

    /// Issue a token of the given type.
    pub fn issue(&self, user_id: i32, username: &str, token_type: TokenType) -> AppResult<String> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to encode token: {e}")))
    }

    /// Issue a fresh access/refresh pair.
    pub fn issue_pair(&self, user_id: i32, username: &str) -> AppResult<TokenPair> {
        Ok(TokenPair {
            refresh: self.issue(user_id, username, TokenType::Refresh)?,
            access: self.issue(user_id, username, TokenType::Access)?,
        })
    }

    /// Validate signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected token");
                AppError::Unauthorized
            })
    }

    /// Validate a token and require a specific type.
    pub fn verify_typed(&self, token: &str, expected: TokenType) -> AppResult<Claims> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new(b"test-secret", Duration::minutes(5), Duration::days(1))
    }

    #[test]
    fn test_issue_and_verify_access() {
        let keys = keys();
        let token = keys.issue(7, "leo", TokenType::Access).unwrap();

        let claims = keys.verify_typed(&token, TokenType::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.username, "leo");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_cannot_authenticate() {
        let keys = keys();
        let pair = keys.issue_pair(7, "leo").unwrap();

        assert!(keys.verify_typed(&pair.refresh, TokenType::Access).is_err());
        assert!(keys.verify_typed(&pair.refresh, TokenType::Refresh).is_ok());
        assert!(keys.verify_typed(&pair.access, TokenType::Refresh).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = JwtKeys::new(b"test-secret", Duration::seconds(-10), Duration::days(1));
        let token = keys.issue(7, "leo", TokenType::Access).unwrap();

        assert!(matches!(keys.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = JwtKeys::new(b"other-secret", Duration::minutes(5), Duration::days(1));
        let token = other.issue(7, "leo", TokenType::Access).unwrap();

        assert!(keys().verify(&token).is_err());
        assert!(keys().verify("not-a-jwt").is_err());
    }

    #[test]
    fn test_unique_token_ids() {
        let keys = keys();
        let a = keys.verify(&keys.issue(1, "a", TokenType::Access).unwrap()).unwrap();
        let b = keys.verify(&keys.issue(1, "a", TokenType::Access).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
