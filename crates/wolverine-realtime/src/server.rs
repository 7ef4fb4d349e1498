//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use wolverine_auth::JwtDecoder;
use wolverine_core::config::RealtimeConfig;
use wolverine_core::error::AppError;

use crate::channel::registry::ChannelRegistry;
use crate::connection::authenticator::{ConnectionIdentity, WsAuthenticator};
use crate::connection::handle::{CloseReason, ConnectionHandle, OutboundFrame};
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::manager::ConnectionManager;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::presence::registry::PresenceRegistry;

/// Central real-time engine that coordinates all WebSocket subsystems.
///
/// Created once at server start; [`RealtimeEngine::shutdown`] closes every
/// connection and empties the registries.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Presence registry.
    pub presence: Arc<PresenceRegistry>,
    /// Channel registry.
    pub channels: Arc<ChannelRegistry>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Handshake authenticator.
    authenticator: WsAuthenticator,
    /// Engine configuration.
    config: RealtimeConfig,
    /// Cancelled on shutdown.
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .field("online", &self.presence.online_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, decoder: Arc<JwtDecoder>) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let presence = Arc::new(PresenceRegistry::new());
        let channels = Arc::new(ChannelRegistry::new());
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            presence.clone(),
            channels.clone(),
            metrics.clone(),
        ));

        info!(
            buffer = config.channel_buffer_size,
            ping_interval_s = config.ping_interval_seconds,
            "Real-time engine initialized"
        );

        Self {
            connections,
            presence,
            channels,
            metrics,
            authenticator: WsAuthenticator::new(decoder),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Verifies a handshake credential.
    pub fn authenticate(&self, token: Option<&str>) -> Result<ConnectionIdentity, AppError> {
        self.authenticator.authenticate(token)
    }

    /// Registers an authenticated connection.
    ///
    /// An upgrade that completes after [`RealtimeEngine::shutdown`] started
    /// is closed straight away, since `close_all` may already have run.
    pub fn connect(
        &self,
        identity: ConnectionIdentity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>) {
        let (handle, rx) = self.connections.connect(identity);
        if self.shutdown.is_cancelled() {
            handle.close(CloseReason::ServerShutdown);
        }
        (handle, rx)
    }

    /// Heartbeat timing for new connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Whether new connections are still accepted.
    pub fn is_accepting(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Token cancelled when the engine shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");

        self.shutdown.cancel();
        self.connections.close_all(CloseReason::ServerShutdown);
        self.presence.clear();

        info!("Real-time engine shut down");
    }
}
