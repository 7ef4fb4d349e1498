//! Integration tests for WebSocket authentication, presence, and delivery.

mod helpers;

use futures::SinkExt;
use serde_json::json;
use tokio_tungstenite::tungstenite::{self, Message};

use wolverine_auth::JwtEncoder;
use wolverine_core::config::AuthConfig;
use wolverine_core::types::UserId;

use helpers::{
    TestServer, expect_silence, next_json, next_message, send_json, send_message, typing,
    wait_until,
};

async fn handshake_status(server: &TestServer, query: &str) -> u16 {
    match tokio_tungstenite::connect_async(server.ws_url(query)).await {
        Ok(_) => panic!("Handshake unexpectedly succeeded"),
        Err(tungstenite::Error::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("Unexpected handshake error: {e}"),
    }
}

#[tokio::test]
async fn test_handshake_without_token_rejected() {
    let server = TestServer::spawn().await;

    assert_eq!(handshake_status(&server, "").await, 401);
    assert_eq!(server.state.realtime.presence.online_count(), 0);
    assert_eq!(server.state.realtime.metrics().connections_opened, 0);
}

#[tokio::test]
async fn test_handshake_with_bad_tokens_rejected() {
    let server = TestServer::spawn().await;

    assert_eq!(handshake_status(&server, "?token=garbage").await, 401);

    let foreign = JwtEncoder::new(&AuthConfig {
        jwt_secret: "some-other-secret".to_string(),
        ..AuthConfig::default()
    });
    let (token, _) = foreign.issue(&UserId::new("u1"), None).unwrap();
    assert_eq!(handshake_status(&server, &format!("?token={token}")).await, 401);

    let (expired, _) = JwtEncoder::new(&server.state.config.auth)
        .issue_with_ttl(&UserId::new("u1"), None, chrono::Duration::minutes(-10))
        .unwrap();
    assert_eq!(handshake_status(&server, &format!("?token={expired}")).await, 401);

    assert!(!server.is_online("u1"));
}

#[tokio::test]
async fn test_message_delivery_and_offline_recipient() {
    let server = TestServer::spawn().await;
    let mut a = server.connect("u1").await;
    let mut b = server.connect("u2").await;

    send_json(&mut a, send_message("c1", "u2", "hi")).await;

    let received = next_json(&mut b).await;
    assert_eq!(received["event"], "new_message");
    assert_eq!(received["data"]["conversationId"], "c1");
    assert_eq!(received["data"]["senderId"], "u1");
    assert_eq!(received["data"]["content"], "hi");
    assert!(received["data"]["createdAt"].is_string());

    let echo = next_json(&mut a).await;
    assert_eq!(echo["event"], "message_sent");
    assert_eq!(echo["data"], received["data"]);

    b.close(None).await.unwrap();
    wait_until(|| !server.is_online("u2")).await;

    send_json(&mut a, send_message("c1", "u2", "hi")).await;
    let echo = next_json(&mut a).await;
    assert_eq!(echo["event"], "message_sent");
    assert_eq!(echo["data"]["content"], "hi");
    expect_silence(&mut a).await;
}

#[tokio::test]
async fn test_sender_id_comes_from_token() {
    let server = TestServer::spawn().await;
    let mut a = server.connect("u1").await;
    let mut b = server.connect("u2").await;

    send_json(
        &mut a,
        json!({
            "event": "send_message",
            "data": {
                "conversationId": "c9",
                "recipientId": "u2",
                "imageUrl": "https://cdn.example/p.png",
                "senderId": "admin",
                "_id": "m42",
                "createdAt": "2024-05-01T10:00:00Z"
            }
        }),
    )
    .await;

    let received = next_json(&mut b).await;
    assert_eq!(received["data"]["senderId"], "u1");
    assert_eq!(received["data"]["_id"], "m42");
    assert_eq!(received["data"]["imageUrl"], "https://cdn.example/p.png");
    assert_eq!(received["data"]["createdAt"], "2024-05-01T10:00:00Z");
}

#[tokio::test]
async fn test_typing_reaches_recipient_without_echo() {
    let server = TestServer::spawn().await;
    let mut a = server.connect("u1").await;
    let mut b = server.connect("u2").await;

    send_json(&mut a, typing("typing", "c1", "u2")).await;
    let notice = next_json(&mut b).await;
    assert_eq!(
        notice,
        json!({ "event": "typing", "data": { "conversationId": "c1", "userId": "u1" } })
    );

    send_json(&mut a, typing("stop_typing", "c1", "u2")).await;
    let notice = next_json(&mut b).await;
    assert_eq!(notice["event"], "stop_typing");

    send_json(&mut a, typing("typing", "c1", "nobody")).await;
    expect_silence(&mut a).await;
    expect_silence(&mut b).await;
}

#[tokio::test]
async fn test_malformed_frame_gets_error_and_connection_survives() {
    let server = TestServer::spawn().await;
    let mut a = server.connect("u1").await;
    let mut b = server.connect("u2").await;

    a.send(Message::text("{ definitely not json")).await.unwrap();
    let error = next_json(&mut a).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["code"], "INVALID_EVENT");

    send_json(&mut a, json!({ "event": "join_room", "data": { "room": "all" } })).await;
    assert_eq!(next_json(&mut a).await["event"], "error");

    send_json(
        &mut a,
        json!({ "event": "send_message", "data": { "conversationId": "c1", "recipientId": "u2" } }),
    )
    .await;
    assert_eq!(next_json(&mut a).await["event"], "error");
    expect_silence(&mut b).await;

    send_json(&mut a, send_message("c1", "u2", "still here")).await;
    assert_eq!(next_json(&mut b).await["event"], "new_message");
    assert_eq!(server.state.realtime.metrics().events_rejected, 3);
}

#[tokio::test]
async fn test_oversized_frame_refused_by_transport() {
    let server = TestServer::spawn().await;
    let mut a = server.connect("u1").await;
    let mut b = server.connect("u2").await;

    let limit = server.state.config.realtime.max_frame_bytes;
    let huge = "x".repeat(limit * 2);
    let _ = a.send(Message::text(send_message("c1", "u2", &huge).to_string())).await;

    wait_until(|| !server.is_online("u1")).await;
    expect_silence(&mut b).await;
    assert_eq!(server.state.realtime.metrics().events_rejected, 0);
}

#[tokio::test]
async fn test_reconnect_supersedes_previous_connection() {
    let server = TestServer::spawn().await;
    let mut first = server.connect("u1").await;
    let first_id = server
        .state
        .realtime
        .presence
        .connection_of(&UserId::new("u1"))
        .unwrap();

    let mut second = server.connect("u1").await;
    let second_id = server
        .state
        .realtime
        .presence
        .connection_of(&UserId::new("u1"))
        .unwrap();
    assert_ne!(first_id, second_id);

    match next_message(&mut first).await {
        Some(Message::Close(Some(frame))) => {
            assert_eq!(u16::from(frame.code), 4000);
            assert_eq!(frame.reason.as_str(), "superseded");
        }
        other => panic!("Expected a close frame, got {other:?}"),
    }
    drop(first);

    wait_until(|| server.state.realtime.connections.connection_count() == 1).await;
    assert_eq!(
        server
            .state
            .realtime
            .presence
            .connection_of(&UserId::new("u1")),
        Some(second_id)
    );

    let mut other = server.connect("u2").await;
    send_json(&mut other, send_message("c1", "u1", "ping")).await;
    assert_eq!(next_json(&mut second).await["event"], "new_message");
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    let server = TestServer::spawn().await;
    let mut a = server.connect("u1").await;

    server.state.realtime.shutdown();

    match next_message(&mut a).await {
        Some(Message::Close(Some(frame))) => assert_eq!(u16::from(frame.code), 1001),
        other => panic!("Expected a close frame, got {other:?}"),
    }
    assert_eq!(server.state.realtime.presence.online_count(), 0);
    assert_eq!(handshake_status(&server, &format!("?token={}", server.token("u2"))).await, 503);
}
