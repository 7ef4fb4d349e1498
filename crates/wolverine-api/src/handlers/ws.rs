//! WebSocket upgrade handler.
//!
//! The credential is verified before the upgrade, so a rejected client gets
//! a plain HTTP 401 and never holds a socket. After the upgrade one task
//! reads frames in arrival order and another drains the outbound queue.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wolverine_core::error::AppError;
use wolverine_realtime::RealtimeEngine;
use wolverine_realtime::connection::{ConnectionHandle, ConnectionIdentity, OutboundFrame};
use wolverine_realtime::connection::heartbeat::run_heartbeat;
use wolverine_realtime::message::codec;

use crate::error::ApiError;
use crate::extractors::HandshakeToken;
use crate::state::AppState;

/// How long the writer may take to flush a close frame.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// GET /ws: authenticated WebSocket upgrade
pub async fn ws_upgrade(
    State(state): State<AppState>,
    HandshakeToken(token): HandshakeToken,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if !state.realtime.is_accepting() {
        return ApiError(AppError::service_unavailable("Server is shutting down")).into_response();
    }

    let identity = match state.realtime.authenticate(token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e.message, "WebSocket handshake rejected");
            return ApiError(e).into_response();
        }
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let engine = state.realtime.clone();
    ws.max_message_size(state.config.realtime.max_frame_bytes)
        .on_upgrade(move |socket| run_connection(engine, identity, socket))
}

/// Drives an established WebSocket connection until it closes.
async fn run_connection(engine: Arc<RealtimeEngine>, identity: ConnectionIdentity, socket: WebSocket) {
    let (handle, outbound_rx) = engine.connect(identity);
    let conn_id = handle.id;
    let (sink, mut stream) = socket.split();

    let heartbeat = tokio::spawn(run_heartbeat(handle.clone(), engine.heartbeat_config()));
    let mut writer = tokio::spawn(write_frames(handle.clone(), outbound_rx, sink));

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    engine.connections.handle_inbound(conn_id, text.as_str());
                }
                Some(Ok(Message::Pong(_))) => handle.record_pong().await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                    break;
                }
            },
        }
    }

    engine.connections.disconnect(conn_id);

    if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
    }
    heartbeat.abort();

    info!(conn_id = %conn_id, user_id = %handle.user_id, "WebSocket connection closed");
}

/// Forwards queued frames to the socket. Sends a close frame when the
/// server closed the connection with a reason.
async fn write_frames(
    handle: Arc<ConnectionHandle>,
    mut outbound_rx: mpsc::Receiver<OutboundFrame>,
    mut sink: SplitSink<WebSocket, Message>,
) {
    loop {
        tokio::select! {
            frame = outbound_rx.recv() => {
                let Some(frame) = frame else { break };
                let message = match frame {
                    OutboundFrame::Event(event) => match codec::encode_outbound(&event) {
                        Ok(text) => Message::Text(text.into()),
                        Err(e) => {
                            warn!(conn_id = %handle.id, error = %e, "Failed to encode event");
                            continue;
                        }
                    },
                    OutboundFrame::Ping => Message::Ping(Bytes::new()),
                };
                if sink.send(message).await.is_err() {
                    handle.mark_closed();
                    break;
                }
            }
            _ = handle.closed() => {
                if let Some(reason) = handle.close_reason() {
                    let frame = CloseFrame {
                        code: reason.code(),
                        reason: Utf8Bytes::from_static(reason.as_str()),
                    };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                }
                break;
            }
        }
    }
}
