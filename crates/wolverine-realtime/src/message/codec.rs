//! JSON encoding for WebSocket frames.

use wolverine_core::error::AppError;

use super::types::{InboundEvent, OutboundEvent};
use super::validator;

/// Parses and validates an inbound text frame.
pub fn decode_inbound(raw: &str, max_bytes: usize) -> Result<InboundEvent, AppError> {
    validator::validate_frame(raw, max_bytes)?;

    let event: InboundEvent = serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Malformed event: {e}")))?;

    validator::validate_event(&event)?;
    Ok(event)
}

/// Serializes an outbound event to a text frame.
pub fn encode_outbound(event: &OutboundEvent) -> Result<String, AppError> {
    Ok(serde_json::to_string(event)?)
}
