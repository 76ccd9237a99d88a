//! Text-frame codec for the relay wire protocol.
//!
//! One JSON object per transport frame. Decoding distinguishes a frame that
//! is not JSON at all from one that is JSON but not a known message, so the
//! server can log the two misuse cases separately; both are skipped, never
//! fatal to the connection or the server.

use thiserror::Error;

use crate::protocol::messages::{EndpointMessage, ServerMessage};

/// Error type for frame encoding and decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame body is not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The frame is JSON but not a recognized message (unknown `type`,
    /// missing required fields, wrong field types).
    #[error("unrecognized message: {0}")]
    UnknownMessage(#[source] serde_json::Error),

    /// An outbound message could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Decodes one inbound text frame into an [`EndpointMessage`].
pub fn decode_message(frame: &str) -> Result<EndpointMessage, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(frame).map_err(ProtocolError::InvalidJson)?;
    serde_json::from_value(value).map_err(ProtocolError::UnknownMessage)
}

/// Encodes one outbound [`ServerMessage`] into a text frame.
pub fn encode_message(message: &ServerMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
