//! Typed message vocabulary for the relay wire protocol.
//!
//! Two enums, one per direction:
//!
//! ```text
//! Endpoint → Server: JSON text frame → EndpointMessage
//! Server → Endpoint: ServerMessage   → JSON text frame
//! ```
//!
//! Using distinct direction-specific enums makes it a compile-time error to
//! send a server-only message from an endpoint, and vice versa.
//!
//! # JSON representation
//!
//! Every message is a JSON object with a kebab-case `"type"` discriminant and
//! camelCase payload fields flattened into the same object:
//!
//! ```json
//! {"type":"command","deviceId":"a1b2c3d4e5f60718","command":"reboot","params":{}}
//! {"type":"device-connected","deviceId":"a1b2c3d4e5f60718","timestamp":"2026-08-07T12:00:00.000Z"}
//! ```
//!
//! `params`, `response`, and `chunk` are opaque to the relay: they are carried
//! as [`serde_json::Value`] and re-wrapped without inspection. The router adds
//! no sequencing, validation, or reassembly for stream chunks; per-sender
//! ordering is whatever the transport provides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::Identity;

// ── Endpoint → Server messages ────────────────────────────────────────────────

/// Messages an endpoint (device or client) sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EndpointMessage {
    /// Bind this connection as a device. Carries no payload; the relay mints
    /// the identity and returns it in `registration-complete`.
    RegisterDevice,

    /// Bind this connection as a client. The `registration-complete` reply
    /// additionally carries a snapshot of every currently registered device.
    RegisterClient,

    /// Ask the relay to deliver a command to the addressed device.
    #[serde(rename_all = "camelCase")]
    Command {
        /// Target device identity, as learned from the device snapshot or a
        /// `device-connected` broadcast.
        device_id: Identity,
        /// Command name, opaque to the relay.
        command: String,
        /// Command arguments, opaque to the relay.
        #[serde(default)]
        params: Value,
    },

    /// Return a command's result to the addressed client.
    #[serde(rename_all = "camelCase")]
    CommandResponse {
        /// Target client identity, as received in `execute-command`.
        client_id: Identity,
        /// Result body, opaque to the relay.
        #[serde(default)]
        response: Value,
        /// Name of the command this result answers.
        command: String,
    },

    /// Push one chunk of a binary stream (camera frames, file transfer, ...)
    /// to the addressed client.
    #[serde(rename_all = "camelCase")]
    BinaryStream {
        /// Target client identity.
        client_id: Identity,
        /// Stream discriminator, e.g. `"camera"` or `"file"`.
        stream_type: String,
        /// Chunk payload, opaque to the relay.
        #[serde(default)]
        chunk: Value,
    },
}

// ── Server → Endpoint messages ────────────────────────────────────────────────

/// Messages the relay sends to an endpoint.
///
/// The sender-identity fields (`clientId` on `execute-command`, `deviceId` on
/// `command-result` and `stream-data`) are optional: the relay does not verify
/// sender roles, and a message relayed from a connection that never registered
/// simply omits the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Confirms a registration and returns the minted identity. The payload
    /// shape depends on the role that registered; see [`RegistrationReply`].
    RegistrationComplete(RegistrationReply),

    /// Lifecycle broadcast to every registered client: a device registered.
    #[serde(rename_all = "camelCase")]
    DeviceConnected {
        device_id: Identity,
        /// RFC 3339 UTC timestamp with millisecond precision, taken when the
        /// broadcast fired.
        timestamp: String,
    },

    /// Lifecycle broadcast to every registered client: a device disconnected.
    #[serde(rename_all = "camelCase")]
    DeviceDisconnected { device_id: Identity },

    /// A relayed command, delivered to the target device.
    #[serde(rename_all = "camelCase")]
    ExecuteCommand {
        command: String,
        params: Value,
        /// Identity of the sending client, omitted if the sender never
        /// registered as one.
        #[serde(skip_serializing_if = "Option::is_none")]
        client_id: Option<Identity>,
    },

    /// A relayed command result, delivered to the target client.
    #[serde(rename_all = "camelCase")]
    CommandResult {
        /// Identity of the responding device, omitted if the sender never
        /// registered as one.
        #[serde(skip_serializing_if = "Option::is_none")]
        device_id: Option<Identity>,
        command: String,
        response: Value,
    },

    /// A relayed stream chunk, delivered to the target client.
    #[serde(rename_all = "camelCase")]
    StreamData {
        /// Identity of the streaming device, omitted if the sender never
        /// registered as one.
        #[serde(skip_serializing_if = "Option::is_none")]
        device_id: Option<Identity>,
        stream_type: String,
        chunk: Value,
    },

    /// Routing failure reported to a `command` sender whose target device is
    /// not connected. The response and stream paths drop silently instead;
    /// that asymmetry is inherited wire behavior, kept on purpose.
    Error { message: String },
}

/// Payload of `registration-complete`, shaped by the registered role.
///
/// Untagged: the two shapes share the event name on the wire and are told
/// apart by their fields, exactly as the original protocol did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistrationReply {
    /// Reply to `register-device`.
    #[serde(rename_all = "camelCase")]
    Device { device_id: Identity },

    /// Reply to `register-client`, with the device snapshot taken at
    /// registration time. Devices that register later arrive via
    /// `device-connected` broadcasts, not retroactively.
    #[serde(rename_all = "camelCase")]
    Client {
        client_id: Identity,
        connected_devices: Vec<Identity>,
    },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
