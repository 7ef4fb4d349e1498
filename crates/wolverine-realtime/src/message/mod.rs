//! WebSocket event types, encoding, and validation.

pub mod codec;
pub mod types;
pub mod validator;

pub use types::{ChatMessage, EventError, InboundEvent, OutboundEvent, TypingNotice};
