//! JWT token creation.
//!
//! Production tokens come from the REST login flow; this encoder mints the
//! same format for the CLI and for tests.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use wolverine_core::config::AuthConfig;
use wolverine_core::error::AppError;
use wolverine_core::types::UserId;

use super::claims::Claims;

/// Creates signed JWT tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in minutes.
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_minutes: i64::try_from(config.jwt_ttl_minutes).unwrap_or(i64::MAX),
        }
    }

    /// Issues a token for the user with the configured TTL.
    pub fn issue(
        &self,
        user_id: &UserId,
        role: Option<&str>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let ttl = Duration::try_minutes(self.ttl_minutes)
            .ok_or_else(|| AppError::configuration("auth.jwt_ttl_minutes is out of range"))?;
        self.issue_with_ttl(user_id, role, ttl)
    }

    /// Issues a token with an explicit TTL (negative values yield expired tokens).
    pub fn issue_with_ttl(
        &self,
        user_id: &UserId,
        role: Option<&str>,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::validation("Token lifetime is out of range"))?;

        let claims = Claims {
            id: user_id.as_str().to_string(),
            role: role.map(str::to_string),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        tracing::debug!(user_id = %user_id, expires_at = %exp, "Issued token");

        Ok((token, exp))
    }
}
