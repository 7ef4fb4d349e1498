//! Connection manager: connection lifecycle and event dispatch.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wolverine_core::config::RealtimeConfig;
use wolverine_core::types::ConnectionId;

use crate::channel::registry::ChannelRegistry;
use crate::channel::types::ChannelName;
use crate::message::codec;
use crate::message::types::{EventError, OutboundEvent};
use crate::metrics::RealtimeMetrics;
use crate::presence::registry::PresenceRegistry;
use crate::router::{self, Delivery, DeliveryTarget, Origin};

use super::authenticator::ConnectionIdentity;
use super::handle::{CloseReason, ConnectionHandle, OutboundFrame};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Every open connection, superseded ones included until they close.
    pool: ConnectionPool,
    /// User → current connection.
    presence: Arc<PresenceRegistry>,
    /// Channel membership.
    channels: Arc<ChannelRegistry>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        presence: Arc<PresenceRegistry>,
        channels: Arc<ChannelRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool: ConnectionPool::new(),
            presence,
            channels,
            metrics,
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// Records presence, joins the user's channel, and force-closes any
    /// connection the user held before. Returns the handle and the receiver
    /// the socket writer drains.
    pub fn connect(
        &self,
        identity: ConnectionIdentity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(identity.user_id, identity.role, tx));

        self.pool.add(handle.clone());

        let superseded = self.presence.register(handle.clone());
        self.channels
            .join(ChannelName::for_user(&handle.user_id), handle.id);

        // A concurrent reconnect may have evicted this handle before it joined.
        if !self.presence.is_current(&handle) {
            self.channels.leave(handle.id);
        }

        if let Some(old) = superseded {
            self.channels.leave(old.id);
            if self.pool.remove(&old.id).is_some() {
                self.metrics.connection_closed();
            }
            old.close(CloseReason::Superseded);
            self.metrics.connection_superseded();
            info!(
                user_id = %handle.user_id,
                old_conn = %old.id,
                new_conn = %handle.id,
                "Superseded previous connection"
            );
        }

        self.metrics.connection_opened();
        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Cleans up after a connection. Safe to call more than once.
    pub fn disconnect(&self, conn_id: ConnectionId) {
        // Runs even when the pool entry is already gone: a superseded
        // connection can join its channel after the eviction.
        self.channels.leave(conn_id);

        let Some(handle) = self.pool.remove(&conn_id) else {
            return;
        };

        let was_current = self.presence.unregister(&handle.user_id, conn_id);
        handle.mark_closed();
        self.metrics.connection_closed();

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            was_current,
            reason = handle.close_reason().map(CloseReason::as_str).unwrap_or("client"),
            "WebSocket connection unregistered"
        );
    }

    /// Processes an inbound text frame from a client.
    ///
    /// Malformed frames are answered with an `error` event on the same
    /// connection and otherwise ignored.
    pub fn handle_inbound(&self, conn_id: ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(&conn_id) else {
            warn!(conn_id = %conn_id, "Frame from unknown connection");
            return;
        };

        let event = match codec::decode_inbound(raw, self.config.max_frame_bytes) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    conn_id = %conn_id,
                    user_id = %handle.user_id,
                    error = %e.message,
                    "Rejected inbound frame"
                );
                self.metrics.event_rejected();
                handle.send(OutboundEvent::Error(EventError::invalid(e.message)));
                return;
            }
        };

        self.metrics.event_received();
        debug!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            event = event.name(),
            recipient = %event.recipient(),
            "Inbound event"
        );

        let origin = Origin {
            user_id: handle.user_id.clone(),
            connection_id: conn_id,
        };
        let recipient = event.recipient().clone();
        let deliveries = router::route(self.presence.as_ref(), &origin, event, Utc::now());

        if !deliveries
            .iter()
            .any(|d| matches!(d.target, DeliveryTarget::Channel(_)))
        {
            debug!(user_id = %origin.user_id, recipient = %recipient, "Recipient offline, event dropped");
            self.metrics.event_dropped();
        }

        for delivery in deliveries {
            self.dispatch(delivery);
        }
    }

    fn dispatch(&self, delivery: Delivery) {
        let targets = match &delivery.target {
            DeliveryTarget::Channel(channel) => self.channels.members(channel),
            DeliveryTarget::Connection(conn_id) => vec![*conn_id],
        };

        for conn_id in targets {
            let sent = self
                .pool
                .get(&conn_id)
                .is_some_and(|h| h.send(delivery.event.clone()));
            if sent {
                self.metrics.event_delivered();
            } else {
                self.metrics.event_dropped();
            }
        }
    }

    /// Asks every open connection to close.
    pub fn close_all(&self, reason: CloseReason) {
        let connections = self.pool.all_connections();
        info!(count = connections.len(), reason = reason.as_str(), "Closing all connections");
        for handle in connections {
            handle.close(reason);
        }
    }

    /// Gets a connection by ID.
    pub fn get(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.pool.get(&conn_id)
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}
