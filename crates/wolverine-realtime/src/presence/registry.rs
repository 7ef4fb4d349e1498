//! Presence registry: which user currently holds which live connection.
//!
//! At most one entry per user. The most recent connection wins, and a
//! disconnect only removes the entry if it still points at the
//! disconnecting connection, so a late close from a superseded socket can
//! never evict its replacement.

use std::sync::Arc;

use dashmap::DashMap;

use wolverine_core::types::{ConnectionId, UserId};

use crate::connection::handle::ConnectionHandle;
use crate::router::PresenceLookup;

/// Map of online users to their current connection.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    online: DashMap<UserId, Arc<ConnectionHandle>>,
}

impl PresenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `handle` as the user's current connection.
    ///
    /// Returns the previous connection if a different one was replaced.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> Option<Arc<ConnectionHandle>> {
        let new_id = handle.id;
        let user_id = handle.user_id.clone();
        let previous = self.online.insert(user_id.clone(), handle);

        match previous {
            Some(prev) if prev.id != new_id => {
                tracing::debug!(
                    user_id = %user_id,
                    old_conn = %prev.id,
                    new_conn = %new_id,
                    "Presence entry replaced"
                );
                Some(prev)
            }
            _ => None,
        }
    }

    /// Removes the user's entry only if it still belongs to `conn_id`.
    ///
    /// Returns whether an entry was removed.
    pub fn unregister(&self, user_id: &UserId, conn_id: ConnectionId) -> bool {
        self.online
            .remove_if(user_id, |_, current| current.id == conn_id)
            .is_some()
    }

    /// Current connection for a user.
    pub fn lookup(&self, user_id: &UserId) -> Option<Arc<ConnectionHandle>> {
        self.online.get(user_id).map(|entry| entry.value().clone())
    }

    /// Connection ID currently registered for a user.
    pub fn connection_of(&self, user_id: &UserId) -> Option<ConnectionId> {
        self.online.get(user_id).map(|entry| entry.value().id)
    }

    /// Whether `handle` is still the registered connection for its user.
    pub fn is_current(&self, handle: &ConnectionHandle) -> bool {
        self.online
            .get(&handle.user_id)
            .is_some_and(|entry| entry.id == handle.id)
    }

    /// Whether the user has a registered connection.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.online.contains_key(user_id)
    }

    /// Number of online users.
    pub fn online_count(&self) -> usize {
        self.online.len()
    }

    /// All online user IDs, sorted.
    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.online.iter().map(|e| e.key().clone()).collect();
        users.sort();
        users
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.online.clear();
    }
}

impl PresenceLookup for PresenceRegistry {
    fn is_present(&self, user_id: &UserId) -> bool {
        self.is_online(user_id)
    }
}
