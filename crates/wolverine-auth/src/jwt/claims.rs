//! JWT claims structure shared with the REST login flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wolverine_core::types::UserId;

/// JWT claims payload.
///
/// The login flow signs the document-store id of the user. Depending on the
/// issuer it appears as `id` or `_id`; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user id.
    #[serde(alias = "_id", alias = "userId")]
    pub id: String,
    /// User role at the time of token issuance, if the issuer included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the user id as a typed identifier.
    pub fn user_id(&self) -> UserId {
        UserId::new(self.id.clone())
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
