//! Integration tests for the relay pipeline.
//!
//! These exercise the application layer of relay-server end-to-end through
//! its public API: `Hub` + `HubEvent` + per-connection outbound queues, the
//! same way the WebSocket transport drives it in production.

use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use relay_core::{EndpointMessage, Identity, RegistrationReply, ServerMessage};
use relay_server::application::{ConnectionId, Hub, HubEvent};

// ── Test endpoint harness ─────────────────────────────────────────────────────

/// One fake endpoint: a connection handle plus the receiving end of its
/// outbound queue.
struct Endpoint {
    id: ConnectionId,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Endpoint {
    fn connect(hub: &mut Hub) -> Self {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        hub.handle_event(HubEvent::Connected { id, outbound: tx });
        Self { id, rx }
    }

    fn send(&self, hub: &mut Hub, message: EndpointMessage) {
        hub.handle_event(HubEvent::Message {
            id: self.id,
            message,
        });
    }

    fn disconnect(self, hub: &mut Hub) {
        hub.handle_event(HubEvent::Disconnected { id: self.id });
    }

    /// Next queued message, or panic with context if none is pending.
    fn next(&mut self) -> ServerMessage {
        self.rx
            .try_recv()
            .expect("endpoint expected a message but its queue is empty")
    }

    fn assert_silent(&mut self) {
        assert!(
            self.rx.try_recv().is_err(),
            "endpoint queue should be empty"
        );
    }
}

fn device(hub: &mut Hub) -> (Endpoint, Identity) {
    let mut endpoint = Endpoint::connect(hub);
    endpoint.send(hub, EndpointMessage::RegisterDevice);
    match endpoint.next() {
        ServerMessage::RegistrationComplete(RegistrationReply::Device { device_id }) => {
            (endpoint, device_id)
        }
        other => panic!("expected device registration-complete, got {other:?}"),
    }
}

fn client(hub: &mut Hub) -> (Endpoint, Identity, Vec<Identity>) {
    let mut endpoint = Endpoint::connect(hub);
    endpoint.send(hub, EndpointMessage::RegisterClient);
    match endpoint.next() {
        ServerMessage::RegistrationComplete(RegistrationReply::Client {
            client_id,
            connected_devices,
        }) => (endpoint, client_id, connected_devices),
        other => panic!("expected client registration-complete, got {other:?}"),
    }
}

fn as_sorted(mut ids: Vec<Identity>) -> Vec<Identity> {
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids
}

// ── Registration ──────────────────────────────────────────────────────────────

#[test]
fn test_device_registration_creates_one_addressable_entry() {
    let mut hub = Hub::new();
    let (mut endpoint, identity) = device(&mut hub);

    assert!(!identity.as_str().is_empty());
    assert_eq!(hub.device_ids(), vec![identity]);
    endpoint.assert_silent();
}

#[test]
fn test_client_snapshot_matches_the_registered_devices() {
    let mut hub = Hub::new();
    let devices: Vec<Identity> = (0..5).map(|_| device(&mut hub).1).collect();

    let (_, _, connected_devices) = client(&mut hub);

    assert_eq!(as_sorted(connected_devices), as_sorted(devices));
}

#[test]
fn test_late_devices_arrive_as_broadcasts_not_in_the_snapshot() {
    let mut hub = Hub::new();
    let (mut observer, _, snapshot) = client(&mut hub);
    assert!(snapshot.is_empty());

    let (_, late_device) = device(&mut hub);

    match observer.next() {
        ServerMessage::DeviceConnected { device_id, .. } => assert_eq!(device_id, late_device),
        other => panic!("expected device-connected, got {other:?}"),
    }
}

#[test]
fn test_device_registration_notifies_each_registered_client_exactly_once() {
    let mut hub = Hub::new();
    let mut observers: Vec<Endpoint> = (0..4).map(|_| client(&mut hub).0).collect();

    let (_, identity) = device(&mut hub);

    for observer in &mut observers {
        match observer.next() {
            ServerMessage::DeviceConnected {
                device_id,
                timestamp,
            } => {
                assert_eq!(device_id, identity);
                assert!(chrono::DateTime::parse_from_rfc3339(&timestamp).is_ok());
            }
            other => panic!("expected device-connected, got {other:?}"),
        }
        observer.assert_silent();
    }
}

// ── Command routing ───────────────────────────────────────────────────────────

#[test]
fn test_command_round_trip_between_client_and_device() {
    let mut hub = Hub::new();
    let (mut dev, dev_id) = device(&mut hub);
    let (mut cli, cli_id, _) = client(&mut hub);

    // Client commands the device.
    cli.send(
        &mut hub,
        EndpointMessage::Command {
            device_id: dev_id.clone(),
            command: "screenshot".to_string(),
            params: json!({"display": 0}),
        },
    );
    match dev.next() {
        ServerMessage::ExecuteCommand {
            command,
            params,
            client_id,
        } => {
            assert_eq!(command, "screenshot");
            assert_eq!(params, json!({"display": 0}));
            assert_eq!(client_id, Some(cli_id.clone()));
        }
        other => panic!("expected execute-command, got {other:?}"),
    }
    cli.assert_silent();

    // Device answers the client.
    dev.send(
        &mut hub,
        EndpointMessage::CommandResponse {
            client_id: cli_id,
            response: json!({"image": "base64..."}),
            command: "screenshot".to_string(),
        },
    );
    match cli.next() {
        ServerMessage::CommandResult {
            device_id,
            command,
            response,
        } => {
            assert_eq!(device_id, Some(dev_id));
            assert_eq!(command, "screenshot");
            assert_eq!(response, json!({"image": "base64..."}));
        }
        other => panic!("expected command-result, got {other:?}"),
    }
}

#[test]
fn test_command_to_unknown_device_reports_routing_failure() {
    let mut hub = Hub::new();
    let (mut cli, _, _) = client(&mut hub);

    cli.send(
        &mut hub,
        EndpointMessage::Command {
            device_id: Identity::from("ffffffffffffffff"),
            command: "reboot".to_string(),
            params: json!(null),
        },
    );

    match cli.next() {
        ServerMessage::Error { message } => assert_eq!(message, "Device not connected"),
        other => panic!("expected error, got {other:?}"),
    }
    cli.assert_silent();
}

#[test]
fn test_commands_are_isolated_to_the_addressed_device() {
    let mut hub = Hub::new();
    let (mut target, target_id) = device(&mut hub);
    let (mut bystander, _) = device(&mut hub);
    let (cli, _, _) = client(&mut hub);

    cli.send(
        &mut hub,
        EndpointMessage::Command {
            device_id: target_id,
            command: "reboot".to_string(),
            params: json!(null),
        },
    );

    assert!(matches!(
        target.next(),
        ServerMessage::ExecuteCommand { .. }
    ));
    bystander.assert_silent();
}

// ── Stream routing ────────────────────────────────────────────────────────────

#[test]
fn test_stream_chunks_flow_to_the_addressed_client_in_order() {
    let mut hub = Hub::new();
    let (dev, dev_id) = device(&mut hub);
    let (mut cli, cli_id, _) = client(&mut hub);

    for seq in 0..4 {
        dev.send(
            &mut hub,
            EndpointMessage::BinaryStream {
                client_id: cli_id.clone(),
                stream_type: "camera".to_string(),
                chunk: json!({"seq": seq}),
            },
        );
    }

    for seq in 0..4 {
        match cli.next() {
            ServerMessage::StreamData {
                device_id,
                stream_type,
                chunk,
            } => {
                assert_eq!(device_id, Some(dev_id.clone()));
                assert_eq!(stream_type, "camera");
                assert_eq!(chunk, json!({"seq": seq}));
            }
            other => panic!("expected stream-data, got {other:?}"),
        }
    }
}

#[test]
fn test_stream_to_departed_client_is_dropped_without_feedback() {
    let mut hub = Hub::new();
    let (mut dev, _) = device(&mut hub);
    let (cli, cli_id, _) = client(&mut hub);
    cli.disconnect(&mut hub);

    dev.send(
        &mut hub,
        EndpointMessage::BinaryStream {
            client_id: cli_id,
            stream_type: "camera".to_string(),
            chunk: json!("AAECAw=="),
        },
    );

    dev.assert_silent();
}

// ── Disconnect lifecycle ──────────────────────────────────────────────────────

#[test]
fn test_device_disconnect_deregisters_and_notifies_clients() {
    let mut hub = Hub::new();
    let mut observers: Vec<Endpoint> = (0..3).map(|_| client(&mut hub).0).collect();
    let (dev, dev_id) = device(&mut hub);
    for observer in &mut observers {
        observer.next(); // drain device-connected
    }

    dev.disconnect(&mut hub);

    assert!(hub.device_ids().is_empty());
    for observer in &mut observers {
        match observer.next() {
            ServerMessage::DeviceDisconnected { device_id } => assert_eq!(device_id, dev_id),
            other => panic!("expected device-disconnected, got {other:?}"),
        }
        observer.assert_silent();
    }
}

#[test]
fn test_command_to_a_device_that_left_yields_routing_failure() {
    let mut hub = Hub::new();
    let (dev, dev_id) = device(&mut hub);
    let (mut cli, _, _) = client(&mut hub);
    dev.disconnect(&mut hub);
    cli.next(); // drain device-disconnected

    cli.send(
        &mut hub,
        EndpointMessage::Command {
            device_id: dev_id,
            command: "reboot".to_string(),
            params: json!(null),
        },
    );

    assert!(matches!(cli.next(), ServerMessage::Error { .. }));
}

#[test]
fn test_client_disconnect_is_silent_for_devices() {
    let mut hub = Hub::new();
    let (mut dev, _) = device(&mut hub);
    let (cli, _, _) = client(&mut hub);

    cli.disconnect(&mut hub);

    assert!(hub.client_ids().is_empty());
    dev.assert_silent();
}

#[test]
fn test_registry_state_survives_a_storm_of_mixed_events() {
    let mut hub = Hub::new();

    // Interleave arrivals and departures and verify the registries track
    // exactly the live endpoints.
    let (d1, d1_id) = device(&mut hub);
    let (_c1, _, _) = client(&mut hub);
    let (_d2, d2_id) = device(&mut hub);
    let (c2, _, _) = client(&mut hub);

    d1.disconnect(&mut hub);
    c2.disconnect(&mut hub);
    let (_d3, d3_id) = device(&mut hub);

    let live = as_sorted(hub.device_ids());
    assert_eq!(live, as_sorted(vec![d2_id, d3_id]));
    assert!(!live.contains(&d1_id));
    assert_eq!(hub.client_ids().len(), 1);
}
