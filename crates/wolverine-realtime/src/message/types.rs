//! Inbound and outbound event definitions.
//!
//! Every frame is a JSON envelope `{"event": "<name>", "data": {...}}`.
//! Payload fields use the camelCase names the web client already speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wolverine_core::types::UserId;

/// Events sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Push a chat message to the recipient.
    SendMessage(SendMessage),
    /// The sender started typing.
    Typing(TypingSignal),
    /// The sender stopped typing.
    StopTyping(TypingSignal),
}

impl InboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "send_message",
            Self::Typing(_) => "typing",
            Self::StopTyping(_) => "stop_typing",
        }
    }

    /// The user the event is addressed to.
    pub fn recipient(&self) -> &UserId {
        match self {
            Self::SendMessage(m) => &m.recipient_id,
            Self::Typing(t) | Self::StopTyping(t) => &t.recipient_id,
        }
    }
}

/// Payload of `send_message`.
///
/// The message has usually been persisted through the REST API first; the
/// client then forwards the stored `_id`, `createdAt` and populated `sender`
/// so the recipient sees the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    /// Conversation the message belongs to.
    pub conversation_id: String,
    /// Addressed user.
    pub recipient_id: UserId,
    /// Message text.
    #[serde(default)]
    pub content: Option<String>,
    /// Attached image reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Client-claimed sender. Ignored: the authenticated identity is used.
    #[serde(default)]
    pub sender_id: Option<String>,
    /// Stored message id.
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    /// Stored creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Populated sender document, forwarded untouched.
    #[serde(default)]
    pub sender: Option<serde_json::Value>,
}

/// Payload of `typing` and `stop_typing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingSignal {
    /// Conversation being typed in.
    pub conversation_id: String,
    /// Addressed user.
    pub recipient_id: UserId,
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// A message addressed to this user.
    NewMessage(ChatMessage),
    /// Delivery confirmation to the sender.
    MessageSent(ChatMessage),
    /// Another user started typing.
    Typing(TypingNotice),
    /// Another user stopped typing.
    StopTyping(TypingNotice),
    /// An inbound frame was rejected.
    Error(EventError),
}

impl OutboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => "new_message",
            Self::MessageSent(_) => "message_sent",
            Self::Typing(_) => "typing",
            Self::StopTyping(_) => "stop_typing",
            Self::Error(_) => "error",
        }
    }
}

/// Message body shared by `new_message` and `message_sent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Conversation the message belongs to.
    pub conversation_id: String,
    /// Authenticated sender.
    pub sender_id: UserId,
    /// Message text.
    pub content: Option<String>,
    /// Attached image reference.
    pub image_url: Option<String>,
    /// Stored message id.
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Populated sender document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<serde_json::Value>,
}

/// Body of outbound typing indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingNotice {
    /// Conversation being typed in.
    pub conversation_id: String,
    /// The user who is typing.
    pub user_id: UserId,
}

/// Body of an `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventError {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl EventError {
    /// Code used for frames that fail to parse or validate.
    pub const INVALID_EVENT: &'static str = "INVALID_EVENT";

    /// Build an `INVALID_EVENT` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: Self::INVALID_EVENT.to_string(),
            message: message.into(),
        }
    }
}
