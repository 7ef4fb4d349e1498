//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use wolverine_api::AppState;
use wolverine_auth::JwtEncoder;
use wolverine_core::config::AppConfig;
use wolverine_core::error::AppError;
use wolverine_core::types::UserId;

/// Client side of a test WebSocket.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for an expected frame.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Secret shared by the server under test and the token helper.
pub const TEST_SECRET: &str = "integration-test-secret";

/// Configuration used by every test server.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.server.environment = "test".to_string();
    config.server.shutdown_grace_seconds = 1;
    config.realtime.ping_interval_seconds = 60;
    config.realtime.max_frame_bytes = 4096;
    config
}

/// A server bound to an ephemeral local port.
pub struct TestServer {
    /// Address the server listens on
    pub addr: SocketAddr,
    /// Shared state, for inspecting the realtime engine
    pub state: AppState,
    encoder: JwtEncoder,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), AppError>>>,
}

impl TestServer {
    /// Start a server with the test configuration
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    /// Start a server with a custom configuration
    pub async fn spawn_with(config: AppConfig) -> Self {
        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(wolverine_api::serve(listener, state.clone(), async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            addr,
            state,
            encoder,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Issue a valid token for a user
    pub fn token(&self, user: &str) -> String {
        self.encoder
            .issue(&UserId::new(user), None)
            .expect("Failed to issue token")
            .0
    }

    /// WebSocket URL carrying the given query string
    pub fn ws_url(&self, query: &str) -> String {
        format!("ws://{}/ws{}", self.addr, query)
    }

    /// Connect as a user and wait until the server has registered it
    pub async fn connect(&self, user: &str) -> WsClient {
        let url = self.ws_url(&format!("?token={}", self.token(user)));
        let expected = self.state.realtime.metrics().connections_opened + 1;
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("WebSocket handshake failed");

        wait_until(|| self.state.realtime.metrics().connections_opened >= expected).await;
        ws
    }

    /// Whether the user is registered as online
    pub fn is_online(&self, user: &str) -> bool {
        self.state.realtime.presence.is_online(&UserId::new(user))
    }

    /// Trigger graceful shutdown and wait for the server task
    pub async fn shutdown(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.task.take() {
            Some(task) => task.await.expect("Server task panicked"),
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Poll until `condition` holds, failing the test after a few seconds
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("Condition not met within {RECV_TIMEOUT:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Send a JSON value as a text frame
pub async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Next message that is not a ping/pong, or `None` if the stream ended
pub async fn next_message(ws: &mut WsClient) -> Option<Message> {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for a frame")?;
        match frame {
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(msg) => return Some(msg),
            Err(_) => return None,
        }
    }
}

/// Next text frame parsed as JSON
pub async fn next_json(ws: &mut WsClient) -> Value {
    match next_message(ws).await {
        Some(Message::Text(text)) => {
            serde_json::from_str(text.as_str()).expect("Server sent invalid JSON")
        }
        other => panic!("Expected a text frame, got {other:?}"),
    }
}

/// Assert that no text frame arrives within a short window
pub async fn expect_silence(ws: &mut WsClient) {
    let quiet = tokio::time::timeout(Duration::from_millis(300), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                other => return other,
            }
        }
    })
    .await;

    if let Ok(Some(Ok(frame))) = quiet {
        panic!("Expected no frame, got {frame:?}");
    }
}

/// `send_message` envelope
pub fn send_message(conversation: &str, recipient: &str, content: &str) -> Value {
    serde_json::json!({
        "event": "send_message",
        "data": {
            "conversationId": conversation,
            "recipientId": recipient,
            "content": content
        }
    })
}

/// `typing` or `stop_typing` envelope
pub fn typing(event: &str, conversation: &str, recipient: &str) -> Value {
    serde_json::json!({
        "event": event,
        "data": { "conversationId": conversation, "recipientId": recipient }
    })
}
