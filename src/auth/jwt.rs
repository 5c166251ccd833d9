use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::{config::AuthConfig, models::Role};

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Build from configuration, generating a random secret when none is set.
    pub fn from_config(config: &AuthConfig) -> Self {
        let ttl = Duration::try_minutes(config.token_ttl_minutes).unwrap_or(Duration::MAX);
        match &config.jwt_secret {
            Some(secret) => Self::new(secret.as_bytes(), ttl),
            None => {
                tracing::warn!(
                    "auth.jwt_secret not set; using a random secret. \
                     Tokens will not survive a restart"
                );
                let mut secret = [0u8; 32];
                rand::thread_rng().fill(&mut secret);
                Self::new(&secret, ttl)
            }
        }
    }

    /// Issue a token for `email` expiring after the configured lifetime.
    pub fn issue(&self, email: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("Token expiry out of range".into()))?;
        let claims = Claims {
            sub: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => {
                    tracing::debug!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            })
    }
}
