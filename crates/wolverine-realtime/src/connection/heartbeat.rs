//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};

use wolverine_core::config::RealtimeConfig;

use super::handle::{CloseReason, ConnectionHandle};

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Silence after which the connection is considered dead
    pub pong_deadline: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: config.ping_interval(),
            pong_deadline: config.pong_deadline(),
        }
    }
}

/// Run heartbeat loop for a connection.
///
/// Sends a ping every interval. Closes the connection with
/// [`CloseReason::HeartbeatTimeout`] once no pong has been seen for longer
/// than the deadline. Returns when the connection closes for any reason.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval_at(Instant::now() + config.ping_interval, config.ping_interval);

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = interval.tick() => {}
        }

        let silence = handle.last_pong().await.elapsed();
        if silence > config.pong_deadline {
            tracing::warn!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                silence_ms = silence.as_millis() as u64,
                "Heartbeat timeout"
            );
            handle.close(CloseReason::HeartbeatTimeout);
            break;
        }

        if !handle.ping() && !handle.is_alive() {
            break;
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
