//! Channel registry: channel membership in both directions.

use std::collections::HashSet;

use dashmap::DashMap;

use wolverine_core::types::ConnectionId;

use super::types::ChannelName;

/// Registry of channels and the connections joined to them.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Channel name → member connections.
    members: DashMap<ChannelName, HashSet<ConnectionId>>,
    /// Connection → the channel it joined.
    membership: DashMap<ConnectionId, ChannelName>,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins a connection to a channel, leaving any channel it was in.
    pub fn join(&self, channel: ChannelName, conn_id: ConnectionId) {
        // Member set first: a concurrent `leave` must never find the
        // membership record without the member it points at.
        self.members
            .entry(channel.clone())
            .or_default()
            .insert(conn_id);

        if let Some(previous) = self.membership.insert(conn_id, channel.clone()) {
            if previous != channel {
                self.remove_member(&previous, conn_id);
            }
        }
    }

    /// Removes a connection from its channel.
    ///
    /// Returns the channel it left, if it was in one.
    pub fn leave(&self, conn_id: ConnectionId) -> Option<ChannelName> {
        let (_, channel) = self.membership.remove(&conn_id)?;
        self.remove_member(&channel, conn_id);
        Some(channel)
    }

    fn remove_member(&self, channel: &ChannelName, conn_id: ConnectionId) {
        if let Some(mut set) = self.members.get_mut(channel) {
            set.remove(&conn_id);
            if set.is_empty() {
                drop(set);
                self.members.remove_if(channel, |_, s| s.is_empty());
            }
        }
    }

    /// Member connections of a channel.
    pub fn members(&self, channel: &ChannelName) -> Vec<ConnectionId> {
        self.members
            .get(channel)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Channel a connection is joined to.
    pub fn channel_of(&self, conn_id: ConnectionId) -> Option<ChannelName> {
        self.membership.get(&conn_id).map(|c| c.value().clone())
    }

    /// Number of channels with at least one member.
    pub fn channel_count(&self) -> usize {
        self.members.len()
    }

    /// Number of joined connections.
    pub fn member_count(&self) -> usize {
        self.membership.len()
    }
}
