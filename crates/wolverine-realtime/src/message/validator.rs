//! Message validation rules.

use wolverine_core::error::AppError;

use super::types::InboundEvent;

/// Longest accepted conversation or user identifier.
const MAX_ID_LEN: usize = 128;

/// Validates a raw frame before parsing.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    Ok(())
}

/// Validates the payload of a parsed event.
pub fn validate_event(event: &InboundEvent) -> Result<(), AppError> {
    let conversation_id = match event {
        InboundEvent::SendMessage(m) => &m.conversation_id,
        InboundEvent::Typing(t) | InboundEvent::StopTyping(t) => &t.conversation_id,
    };
    validate_id("conversationId", conversation_id)?;
    validate_id("recipientId", event.recipient().as_str())?;

    if let InboundEvent::SendMessage(m) = event {
        let has_text = m.content.as_deref().is_some_and(|c| !c.trim().is_empty());
        let has_image = m.image_url.as_deref().is_some_and(|u| !u.trim().is_empty());
        if !has_text && !has_image {
            return Err(AppError::validation(
                "send_message requires content or imageUrl",
            ));
        }
    }

    Ok(())
}

fn validate_id(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_ID_LEN {
        return Err(AppError::validation(format!(
            "{field} exceeds {MAX_ID_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::{SendMessage, TypingSignal};
    use wolverine_core::types::UserId;

    fn message(content: Option<&str>, image: Option<&str>) -> InboundEvent {
        InboundEvent::SendMessage(SendMessage {
            conversation_id: "c1".to_string(),
            recipient_id: UserId::new("u2"),
            content: content.map(str::to_string),
            image_url: image.map(str::to_string),
            sender_id: None,
            id: None,
            created_at: None,
            sender: None,
        })
    }

    #[test]
    fn test_frame_limits() {
        assert!(validate_frame("{}", 16).is_ok());
        assert!(validate_frame("   ", 16).is_err());
        assert!(validate_frame(&"x".repeat(17), 16).is_err());
    }

    #[test]
    fn test_message_needs_body() {
        assert!(validate_event(&message(Some("hi"), None)).is_ok());
        assert!(validate_event(&message(None, Some("https://cdn/x.png"))).is_ok());
        assert!(validate_event(&message(Some("  "), None)).is_err());
        assert!(validate_event(&message(None, None)).is_err());
    }

    #[test]
    fn test_blank_recipient_rejected() {
        let event = InboundEvent::Typing(TypingSignal {
            conversation_id: "c1".to_string(),
            recipient_id: UserId::new(""),
        });
        let err = validate_event(&event).unwrap_err();
        assert!(err.message.contains("recipientId"));
    }
}
