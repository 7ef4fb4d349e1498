//! Event routing.
//!
//! Routing is a pure decision: given who is online, who sent the event and
//! the event itself, produce the list of deliveries. The connection manager
//! performs them.

use chrono::{DateTime, Utc};

use wolverine_core::types::{ConnectionId, UserId};

use crate::channel::types::ChannelName;
use crate::message::types::{ChatMessage, InboundEvent, OutboundEvent, SendMessage, TypingNotice};

/// Read-only view of who is online.
pub trait PresenceLookup {
    /// Whether the user currently has a registered connection.
    fn is_present(&self, user_id: &UserId) -> bool;
}

/// The connection an inbound event arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Authenticated sender.
    pub user_id: UserId,
    /// Connection the frame was read from.
    pub connection_id: ConnectionId,
}

/// Where a routed event goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// Every member of a channel.
    Channel(ChannelName),
    /// One specific connection.
    Connection(ConnectionId),
}

/// One outbound event and its target.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Target.
    pub target: DeliveryTarget,
    /// Event to send.
    pub event: OutboundEvent,
}

impl Delivery {
    fn to_user(user_id: &UserId, event: OutboundEvent) -> Self {
        Self {
            target: DeliveryTarget::Channel(ChannelName::for_user(user_id)),
            event,
        }
    }

    fn to_connection(conn_id: ConnectionId, event: OutboundEvent) -> Self {
        Self {
            target: DeliveryTarget::Connection(conn_id),
            event,
        }
    }
}

/// Decide the deliveries for an inbound event.
///
/// An absent recipient yields no recipient delivery and no error.
pub fn route(
    presence: &impl PresenceLookup,
    origin: &Origin,
    event: InboundEvent,
    now: DateTime<Utc>,
) -> Vec<Delivery> {
    match event {
        InboundEvent::SendMessage(msg) => route_message(presence, origin, msg, now),
        InboundEvent::Typing(signal) => {
            if !presence.is_present(&signal.recipient_id) {
                return Vec::new();
            }
            let notice = TypingNotice {
                conversation_id: signal.conversation_id,
                user_id: origin.user_id.clone(),
            };
            vec![Delivery::to_user(
                &signal.recipient_id,
                OutboundEvent::Typing(notice),
            )]
        }
        InboundEvent::StopTyping(signal) => {
            if !presence.is_present(&signal.recipient_id) {
                return Vec::new();
            }
            let notice = TypingNotice {
                conversation_id: signal.conversation_id,
                user_id: origin.user_id.clone(),
            };
            vec![Delivery::to_user(
                &signal.recipient_id,
                OutboundEvent::StopTyping(notice),
            )]
        }
    }
}

fn route_message(
    presence: &impl PresenceLookup,
    origin: &Origin,
    msg: SendMessage,
    now: DateTime<Utc>,
) -> Vec<Delivery> {
    let recipient = msg.recipient_id;
    let payload = ChatMessage {
        conversation_id: msg.conversation_id,
        sender_id: origin.user_id.clone(),
        content: msg.content,
        image_url: msg.image_url,
        id: msg.id,
        created_at: msg.created_at.unwrap_or(now),
        sender: msg.sender,
    };

    let mut deliveries = Vec::with_capacity(2);
    if presence.is_present(&recipient) {
        deliveries.push(Delivery::to_user(
            &recipient,
            OutboundEvent::NewMessage(payload.clone()),
        ));
    }
    deliveries.push(Delivery::to_connection(
        origin.connection_id,
        OutboundEvent::MessageSent(payload),
    ));
    deliveries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::TypingSignal;
    use std::collections::HashSet;

    struct Online(HashSet<UserId>);

    impl Online {
        fn of(users: &[&str]) -> Self {
            Self(users.iter().map(|u| UserId::new(*u)).collect())
        }
    }

    impl PresenceLookup for Online {
        fn is_present(&self, user_id: &UserId) -> bool {
            self.0.contains(user_id)
        }
    }

    fn origin() -> Origin {
        Origin {
            user_id: UserId::new("u1"),
            connection_id: ConnectionId::new(),
        }
    }

    fn send(recipient: &str) -> InboundEvent {
        InboundEvent::SendMessage(SendMessage {
            conversation_id: "c1".to_string(),
            recipient_id: UserId::new(recipient),
            content: Some("hi".to_string()),
            image_url: None,
            sender_id: Some("spoofed".to_string()),
            id: Some("m1".to_string()),
            created_at: None,
            sender: None,
        })
    }

    #[test]
    fn test_message_to_present_recipient() {
        let origin = origin();
        let now = Utc::now();
        let out = route(&Online::of(&["u1", "u2"]), &origin, send("u2"), now);

        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0].target,
            DeliveryTarget::Channel(ChannelName::for_user(&UserId::new("u2")))
        );
        let OutboundEvent::NewMessage(ref msg) = out[0].event else {
            panic!("expected new_message");
        };
        assert_eq!(msg.sender_id, UserId::new("u1"));
        assert_eq!(msg.created_at, now);
        assert_eq!(msg.id.as_deref(), Some("m1"));

        assert_eq!(out[1].target, DeliveryTarget::Connection(origin.connection_id));
        assert!(matches!(out[1].event, OutboundEvent::MessageSent(_)));
    }

    #[test]
    fn test_message_to_absent_recipient_only_echoes() {
        let origin = origin();
        let out = route(&Online::of(&["u1"]), &origin, send("u2"), Utc::now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, DeliveryTarget::Connection(origin.connection_id));
    }

    #[test]
    fn test_client_created_at_preserved() {
        let stored = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut event = send("u2");
        if let InboundEvent::SendMessage(ref mut m) = event {
            m.created_at = Some(stored);
        }
        let out = route(&Online::of(&["u2"]), &origin(), event, Utc::now());
        let OutboundEvent::NewMessage(ref msg) = out[0].event else {
            panic!("expected new_message");
        };
        assert_eq!(msg.created_at, stored);
    }

    #[test]
    fn test_typing_has_no_echo() {
        let signal = TypingSignal {
            conversation_id: "c1".to_string(),
            recipient_id: UserId::new("u2"),
        };
        let present = Online::of(&["u2"]);

        let out = route(&present, &origin(), InboundEvent::Typing(signal.clone()), Utc::now());
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].event,
            OutboundEvent::Typing(TypingNotice {
                conversation_id: "c1".to_string(),
                user_id: UserId::new("u1"),
            })
        );

        let out = route(&present, &origin(), InboundEvent::StopTyping(signal.clone()), Utc::now());
        assert!(matches!(out[0].event, OutboundEvent::StopTyping(_)));

        let absent = Online::of(&[]);
        let out = route(&absent, &origin(), InboundEvent::Typing(signal.clone()), Utc::now());
        assert!(out.is_empty());

        let out = route(&absent, &origin(), InboundEvent::StopTyping(signal), Utc::now());
        assert!(out.is_empty());
    }
}
