//! The hub: owner of all relay state.
//!
//! One hub instance runs per server process. The transport layer feeds it
//! [`HubEvent`]s through a single mpsc channel, so every registry mutation
//! happens on one task and no locks are needed. Outbound delivery goes
//! through per-connection unbounded channels; a push never blocks, so one
//! slow or stuck recipient cannot stall registration, routing, or broadcasts
//! for anyone else.
//!
//! # Connection lifecycle
//!
//! ```text
//! Connected ──► Unbound ──register-device──► Device ──Disconnected──► gone
//!                  │
//!                  └───────register-client──► Client ──Disconnected──► gone
//! ```
//!
//! Registration mints the identity, inserts it into the matching registry,
//! and replies with `registration-complete`. Disconnect removes the peer and
//! its registry entry; for devices it also fires the `device-disconnected`
//! broadcast. A second registration attempt on a bound connection is ignored
//! with a warning, keeping the first binding authoritative.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use relay_core::{
    EndpointMessage, Identity, Registry, RegistrationReply, ServerMessage, SessionState,
};

/// Transport-level handle for one live connection.
///
/// Minted by the transport when a connection is accepted. Distinct from the
/// domain [`Identity`], which exists only once the connection registers.
pub type ConnectionId = Uuid;

/// Sender half of a connection's outbound queue. The transport's writer task
/// owns the receiving half and drains it onto the socket.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Events delivered to the hub by the transport layer.
#[derive(Debug)]
pub enum HubEvent {
    /// A connection completed its handshake and can receive messages.
    Connected {
        id: ConnectionId,
        outbound: OutboundSender,
    },
    /// A decoded message arrived on a connection.
    Message {
        id: ConnectionId,
        message: EndpointMessage,
    },
    /// A connection closed. Sent exactly once per connection; no further
    /// events follow for this `id`.
    Disconnected { id: ConnectionId },
}

/// Per-connection state tracked by the hub.
pub(crate) struct Peer {
    pub(crate) outbound: OutboundSender,
    pub(crate) session: SessionState,
}

/// The relay hub: peer table plus the two identity registries.
pub struct Hub {
    pub(crate) peers: HashMap<ConnectionId, Peer>,
    pub(crate) devices: Registry<ConnectionId>,
    pub(crate) clients: Registry<ConnectionId>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
            devices: Registry::new(),
            clients: Registry::new(),
        }
    }

    /// Consumes events until every [`HubEvent`] sender is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<HubEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        debug!("hub event channel closed; hub task ending");
    }

    /// Applies one event. Synchronous: every outbound delivery is a
    /// non-blocking channel push, so no handler can stall the hub.
    pub fn handle_event(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected { id, outbound } => self.handle_connected(id, outbound),
            HubEvent::Message { id, message } => self.handle_message(id, message),
            HubEvent::Disconnected { id } => self.handle_disconnected(id),
        }
    }

    /// Snapshot of all registered device identities.
    pub fn device_ids(&self) -> Vec<Identity> {
        self.devices.snapshot()
    }

    /// Snapshot of all registered client identities.
    pub fn client_ids(&self) -> Vec<Identity> {
        self.clients.snapshot()
    }

    // ── Event handlers ────────────────────────────────────────────────────────

    fn handle_connected(&mut self, id: ConnectionId, outbound: OutboundSender) {
        debug!("connection {id} established");
        self.peers.insert(
            id,
            Peer {
                outbound,
                session: SessionState::Unbound,
            },
        );
    }

    fn handle_message(&mut self, id: ConnectionId, message: EndpointMessage) {
        match message {
            EndpointMessage::RegisterDevice => self.register_device(id),
            EndpointMessage::RegisterClient => self.register_client(id),
            EndpointMessage::Command {
                device_id,
                command,
                params,
            } => self.relay_command(id, device_id, command, params),
            EndpointMessage::CommandResponse {
                client_id,
                response,
                command,
            } => self.relay_response(id, client_id, command, response),
            EndpointMessage::BinaryStream {
                client_id,
                stream_type,
                chunk,
            } => self.relay_stream(id, client_id, stream_type, chunk),
        }
    }

    fn register_device(&mut self, id: ConnectionId) {
        let identity = Identity::generate();
        let outbound = match self.peers.get_mut(&id) {
            Some(peer) => match peer.session.bind_device(identity.clone()) {
                Ok(()) => peer.outbound.clone(),
                Err(err) => {
                    warn!("connection {id}: register-device ignored: {err}");
                    return;
                }
            },
            None => {
                debug!("register-device from unknown connection {id}");
                return;
            }
        };

        self.devices.insert(identity.clone(), id);
        info!("device registered: {identity}");

        send_to(
            &outbound,
            ServerMessage::RegistrationComplete(RegistrationReply::Device {
                device_id: identity.clone(),
            }),
        );
        self.broadcast_device_connected(&identity);
    }

    fn register_client(&mut self, id: ConnectionId) {
        let identity = Identity::generate();
        let outbound = match self.peers.get_mut(&id) {
            Some(peer) => match peer.session.bind_client(identity.clone()) {
                Ok(()) => peer.outbound.clone(),
                Err(err) => {
                    warn!("connection {id}: register-client ignored: {err}");
                    return;
                }
            },
            None => {
                debug!("register-client from unknown connection {id}");
                return;
            }
        };

        self.clients.insert(identity.clone(), id);
        info!("client registered: {identity}");

        // Devices that register after this snapshot reach the client through
        // `device-connected` broadcasts, not retroactively.
        let connected_devices = self.devices.snapshot();
        send_to(
            &outbound,
            ServerMessage::RegistrationComplete(RegistrationReply::Client {
                client_id: identity,
                connected_devices,
            }),
        );
    }

    fn handle_disconnected(&mut self, id: ConnectionId) {
        let Some(mut peer) = self.peers.remove(&id) else {
            debug!("disconnect for unknown connection {id}");
            return;
        };

        match peer.session.close() {
            SessionState::Device(identity) => {
                self.devices.remove(&identity);
                info!("device disconnected: {identity}");
                self.broadcast_device_disconnected(&identity);
            }
            SessionState::Client(identity) => {
                // No broadcast to devices; clients leave silently.
                self.clients.remove(&identity);
                info!("client disconnected: {identity}");
            }
            SessionState::Unbound => debug!("unbound connection {id} closed"),
            SessionState::Closed => {}
        }
    }

    // ── Sender-identity helpers used by the relay router ──────────────────────

    pub(crate) fn sender_client_identity(&self, id: ConnectionId) -> Option<Identity> {
        self.peers
            .get(&id)
            .and_then(|peer| peer.session.client_identity())
            .cloned()
    }

    pub(crate) fn sender_device_identity(&self, id: ConnectionId) -> Option<Identity> {
        self.peers
            .get(&id)
            .and_then(|peer| peer.session.device_identity())
            .cloned()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

/// Pushes one message onto a connection's outbound queue.
///
/// A failed push means the connection is already tearing down; the message
/// is dropped, matching the fire-and-forget delivery contract.
pub(crate) fn send_to(outbound: &OutboundSender, message: ServerMessage) {
    if outbound.send(message).is_err() {
        debug!("outbound queue closed; dropping message");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
