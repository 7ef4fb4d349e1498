//! WebSocket authentication: validates the handshake token before any
//! connection state is created.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use wolverine_auth::JwtDecoder;
use wolverine_core::error::AppError;
use wolverine_core::types::UserId;

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionIdentity {
    /// User ID.
    pub user_id: UserId,
    /// Role claim, if present.
    pub role: Option<String>,
    /// When the credential expires.
    pub expires_at: DateTime<Utc>,
}

/// Authenticates WebSocket connections using JWT tokens.
#[derive(Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates a handshake credential.
    pub fn authenticate(&self, token: Option<&str>) -> Result<ConnectionIdentity, AppError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("No token provided"))?;

        let claims = self.decoder.decode(token)?;

        Ok(ConnectionIdentity {
            user_id: claims.user_id(),
            expires_at: claims.expires_at(),
            role: claims.role,
        })
    }
}
