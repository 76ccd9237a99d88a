//! Lifecycle broadcasts.
//!
//! Clients learn about device arrivals and departures through two broadcast
//! events: `device-connected` (with a timestamp) when a device registers and
//! `device-disconnected` when one goes away. Devices receive neither, and
//! client arrivals are not announced to anyone.
//!
//! Both broadcasts iterate a snapshot of the client registry taken at the
//! moment of the triggering event. The snapshot decouples the iteration from
//! the live mapping; a client that registers while a broadcast is in flight
//! may miss that one event and catches up through its own registration
//! snapshot. Deliveries are independent non-blocking pushes, so one stuck
//! recipient cannot hold up the rest.

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use relay_core::{Identity, ServerMessage};

use crate::application::hub::{send_to, Hub};

impl Hub {
    /// Announces a freshly registered device to every registered client.
    pub(crate) fn broadcast_device_connected(&self, device_id: &Identity) {
        let timestamp = broadcast_timestamp();
        let recipients = self.clients.snapshot();
        debug!(
            "broadcasting device-connected {device_id} to {} client(s)",
            recipients.len()
        );

        for client in recipients {
            self.notify_client(
                &client,
                ServerMessage::DeviceConnected {
                    device_id: device_id.clone(),
                    timestamp: timestamp.clone(),
                },
            );
        }
    }

    /// Announces a departed device to every registered client.
    pub(crate) fn broadcast_device_disconnected(&self, device_id: &Identity) {
        let recipients = self.clients.snapshot();
        debug!(
            "broadcasting device-disconnected {device_id} to {} client(s)",
            recipients.len()
        );

        for client in recipients {
            self.notify_client(
                &client,
                ServerMessage::DeviceDisconnected {
                    device_id: device_id.clone(),
                },
            );
        }
    }

    fn notify_client(&self, client: &Identity, message: ServerMessage) {
        // A snapshot entry can outlive its peer by one event; skip the gap.
        let Some(conn) = self.clients.lookup(client) else {
            return;
        };
        let Some(peer) = self.peers.get(conn) else {
            return;
        };
        send_to(&peer.outbound, message);
    }
}

/// Wall-clock timestamp attached to `device-connected`: RFC 3339 UTC with
/// millisecond precision, e.g. `2026-08-07T09:30:00.123Z`.
fn broadcast_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
