//! Channel naming.

use std::fmt;

use serde::{Deserialize, Serialize};

use wolverine_core::types::UserId;

/// Name of a delivery channel.
///
/// Every connection joins exactly one channel, named after its user, so
/// events addressed to a user reach whichever connection holds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    /// Personal channel of a user (`user:{id}`).
    pub fn for_user(user_id: &UserId) -> Self {
        Self(format!("user:{user_id}"))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
