//! The relay router.
//!
//! Three operations, each keyed on the target identity the sender put in the
//! message payload. The router resolves the target through the matching
//! registry and forwards a re-wrapped message to that connection's outbound
//! queue; it never inspects command names, parameters, or chunk bytes, and
//! it adds no sequencing or acknowledgment of its own.
//!
//! Routing-failure reporting is asymmetric on purpose: a `command` whose
//! device is absent earns the sender an `error` reply, while a
//! `command-response` or `binary-stream` whose client is absent is dropped
//! silently. Endpoints in the field depend on that exact behavior.
//!
//! The router also does not verify sender roles. Whatever identity the
//! sender's session holds for the forwarded direction is attached; if it
//! holds none, the sender-identity field is simply omitted.

use serde_json::Value;
use tracing::{debug, warn};

use relay_core::{Identity, ServerMessage};

use crate::application::hub::{send_to, ConnectionId, Hub};

/// Error text returned to a `command` sender whose target is absent.
const DEVICE_NOT_CONNECTED: &str = "Device not connected";

impl Hub {
    /// Relays a command to the addressed device, or reports the routing
    /// failure back to the sender.
    pub(crate) fn relay_command(
        &self,
        sender: ConnectionId,
        device_id: Identity,
        command: String,
        params: Value,
    ) {
        match self.devices.lookup(&device_id).copied() {
            Some(target) => {
                debug!("relaying command {command} to device {device_id}");
                let client_id = self.sender_client_identity(sender);
                self.forward(
                    target,
                    ServerMessage::ExecuteCommand {
                        command,
                        params,
                        client_id,
                    },
                );
            }
            None => {
                warn!("command {command} for unconnected device {device_id}");
                self.forward(
                    sender,
                    ServerMessage::Error {
                        message: DEVICE_NOT_CONNECTED.to_string(),
                    },
                );
            }
        }
    }

    /// Relays a command result to the addressed client. An absent client is
    /// a silent drop.
    pub(crate) fn relay_response(
        &self,
        sender: ConnectionId,
        client_id: Identity,
        command: String,
        response: Value,
    ) {
        match self.clients.lookup(&client_id).copied() {
            Some(target) => {
                debug!("relaying result of {command} to client {client_id}");
                let device_id = self.sender_device_identity(sender);
                self.forward(
                    target,
                    ServerMessage::CommandResult {
                        device_id,
                        command,
                        response,
                    },
                );
            }
            None => debug!("dropping result of {command}: client {client_id} not connected"),
        }
    }

    /// Relays a stream chunk to the addressed client. An absent client is a
    /// silent drop.
    pub(crate) fn relay_stream(
        &self,
        sender: ConnectionId,
        client_id: Identity,
        stream_type: String,
        chunk: Value,
    ) {
        match self.clients.lookup(&client_id).copied() {
            Some(target) => {
                let device_id = self.sender_device_identity(sender);
                self.forward(
                    target,
                    ServerMessage::StreamData {
                        device_id,
                        stream_type,
                        chunk,
                    },
                );
            }
            None => debug!("dropping {stream_type} chunk: client {client_id} not connected"),
        }
    }

    /// Queues a message for a resolved target connection.
    ///
    /// A registry entry whose peer is already gone means the disconnect is
    /// mid-flight; the message is dropped like any other send race.
    fn forward(&self, target: ConnectionId, message: ServerMessage) {
        match self.peers.get(&target) {
            Some(peer) => send_to(&peer.outbound, message),
            None => debug!("target connection {target} vanished before delivery"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
