//! Individual WebSocket connection handle.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use wolverine_core::types::{ConnectionId, UserId};

use crate::message::types::OutboundEvent;

/// Frames queued for the socket writer.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    /// An application event, serialized to a text frame by the writer.
    Event(OutboundEvent),
    /// A protocol-level ping.
    Ping,
}

/// Why the server closed a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// A newer connection for the same user took over.
    Superseded,
    /// No pong arrived within the deadline.
    HeartbeatTimeout,
    /// The server is going away.
    ServerShutdown,
}

impl CloseReason {
    /// WebSocket close code sent to the client.
    pub fn code(self) -> u16 {
        match self {
            Self::Superseded => 4000,
            Self::HeartbeatTimeout => 4001,
            Self::ServerShutdown => 1001,
        }
    }

    /// Close reason text sent to the client.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Superseded => "superseded",
            Self::HeartbeatTimeout => "heartbeat_timeout",
            Self::ServerShutdown => "server_shutdown",
        }
    }
}

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the outbound queue plus the identity the
/// connection authenticated as. The socket task owns the receiver half and
/// watches [`ConnectionHandle::closed`] to learn when the server wants the
/// connection gone.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// Role claim, if the token carried one
    pub role: Option<String>,
    /// Sender for outbound frames
    sender: mpsc::Sender<OutboundFrame>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Last pong (or connect time)
    last_pong: RwLock<Instant>,
    /// Cancelled once the connection is closing
    cancel: CancellationToken,
    /// Set when the server initiated the close
    close_reason: OnceLock<CloseReason>,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: UserId, role: Option<String>, sender: mpsc::Sender<OutboundFrame>) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            role,
            sender,
            connected_at: Utc::now(),
            last_pong: RwLock::new(Instant::now()),
            cancel: CancellationToken::new(),
            close_reason: OnceLock::new(),
        }
    }

    /// Queue an event for this connection.
    ///
    /// Never blocks: a full queue drops the event.
    pub fn send(&self, event: OutboundEvent) -> bool {
        self.enqueue(OutboundFrame::Event(event))
    }

    /// Queue a protocol ping.
    pub fn ping(&self) -> bool {
        self.enqueue(OutboundFrame::Ping)
    }

    fn enqueue(&self, frame: OutboundFrame) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, user_id = %self.user_id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Ask the socket task to close with the given reason.
    ///
    /// The first reason wins if called more than once.
    pub fn close(&self, reason: CloseReason) {
        let _ = self.close_reason.set(reason);
        self.cancel.cancel();
    }

    /// Mark the connection closed without a server reason.
    pub fn mark_closed(&self) {
        self.cancel.cancel();
    }

    /// Resolves once the connection is closing.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    /// Reason recorded by [`ConnectionHandle::close`], if any.
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason.get().copied()
    }

    /// Record a pong response
    pub async fn record_pong(&self) {
        let mut lp = self.last_pong.write().await;
        *lp = Instant::now();
    }

    /// Time of the last pong.
    pub async fn last_pong(&self) -> Instant {
        *self.last_pong.read().await
    }

    /// Get a snapshot of connection info
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            user_id: self.user_id.clone(),
            role: self.role.clone(),
            connected_at: self.connected_at,
            alive: self.is_alive(),
        }
    }
}

/// Snapshot of connection info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// User ID
    pub user_id: UserId,
    /// Role
    pub role: Option<String>,
    /// Connected at
    pub connected_at: DateTime<Utc>,
    /// Is alive
    pub alive: bool,
}
