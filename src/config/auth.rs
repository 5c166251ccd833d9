use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Longest accepted access token lifetime (ten years).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 525_600 * 10;

/// Authentication configuration: password hashing and bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret used to sign HS256 access tokens.
    ///
    /// When omitted, a random secret is generated at startup and every
    /// issued token becomes invalid on restart.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,

    /// PBKDF2 iteration count for new password hashes. Existing hashes keep
    /// the count they were created with.
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: default_token_ttl_minutes(),
            password_iterations: default_password_iterations(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.jwt_secret
            && secret.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "auth.jwt_secret cannot be empty".into(),
            ));
        }
        if self.token_ttl_minutes <= 0 {
            return Err(ConfigError::Validation(
                "auth.token_ttl_minutes must be positive".into(),
            ));
        }
        if self.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(ConfigError::Validation(format!(
                "auth.token_ttl_minutes must be at most {MAX_TOKEN_TTL_MINUTES}"
            )));
        }
        if self.password_iterations == 0 {
            return Err(ConfigError::Validation(
                "auth.password_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_token_ttl_minutes() -> i64 {
    30
}

fn default_password_iterations() -> u32 {
    100_000
}
