//! WebSocket transport: accept loop and per-connection tasks.
//!
//! This module is responsible for:
//!
//! 1. Binding the relay TCP listener.
//! 2. Accepting endpoint connections and upgrading them to WebSocket.
//! 3. Announcing each connection to the hub and wiring up its outbound queue.
//! 4. Running a writer task (outbound queue → JSON text frames) and a read
//!    loop (text frames → decoded [`HubEvent::Message`]s) per connection.
//! 5. Reporting the disconnect to the hub exactly once when either side ends.
//!
//! Each connection runs in its own tokio task; the accept loop never waits on
//! connection I/O. A malformed frame is logged and skipped rather than
//! closing the session, and nothing a single connection sends can crash or
//! stall the handling of any other connection.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use relay_core::{decode_message, encode_message, EndpointMessage};

use crate::application::hub::{ConnectionId, HubEvent};

/// How often the accept loop wakes up to poll the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

/// Runs the relay accept loop until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (port in use,
/// insufficient permissions).
pub async fn run_relay_server(
    listen_addr: SocketAddr,
    hub_tx: mpsc::UnboundedSender<HubEvent>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind relay listener on {listen_addr}"))?;

    info!("relay listening on {listen_addr}");

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping relay accept loop");
            break;
        }

        // Bounded accept so the loop can poll `running` even when idle.
        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let tx = hub_tx.clone();
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, tx).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error (e.g. out of file descriptors); keep
                // serving the connections that already exist.
                error!("relay accept error: {e}");
            }
            Err(_) => {
                // Poll timeout; loop back to check the shutdown flag.
            }
        }
    }

    Ok(())
}

// ── Per-connection handling ───────────────────────────────────────────────────

/// Entry point of each per-connection task; logs the session outcome.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    hub_tx: mpsc::UnboundedSender<HubEvent>,
) {
    match run_connection(stream, peer_addr, hub_tx).await {
        Ok(()) => info!("connection {peer_addr} closed"),
        Err(e) => warn!("connection {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of one endpoint connection.
///
/// # Errors
///
/// Returns an error only if the WebSocket handshake fails; everything after
/// the handshake is handled in-loop.
async fn run_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    hub_tx: mpsc::UnboundedSender<HubEvent>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    // The transport-level handle. The domain identity is minted later, by the
    // hub, if and when this endpoint registers.
    let id: ConnectionId = Uuid::new_v4();
    info!("connection {id} established from {peer_addr}");

    let (ws_tx, mut ws_rx) = ws_stream.split();

    // Outbound queue: the hub pushes ServerMessages, the writer task drains
    // them onto the socket. Unbounded, so hub-side sends never block.
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();

    if hub_tx
        .send(HubEvent::Connected {
            id,
            outbound: outbound_tx,
        })
        .is_err()
    {
        // Hub already gone; the server is shutting down.
        return Ok(());
    }

    // ── Writer task: outbound queue → socket ──────────────────────────────────
    let writer = tokio::spawn(async move {
        let mut ws_tx = ws_tx;
        while let Some(message) = outbound_rx.recv().await {
            match encode_message(&message) {
                Ok(frame) => {
                    if ws_tx.send(WsMessage::Text(frame)).await.is_err() {
                        debug!("connection {id}: socket write failed (peer gone)");
                        break;
                    }
                }
                Err(e) => error!("connection {id}: encode error: {e}"),
            }
        }
        let _ = ws_tx.close().await;
    });

    // ── Read loop: socket → hub ───────────────────────────────────────────────
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match decode_message(&text) {
                Ok(message) => {
                    debug!(
                        "connection {id}: received {}",
                        message_type_name(&message)
                    );
                    if hub_tx.send(HubEvent::Message { id, message }).is_err() {
                        break;
                    }
                }
                // Protocol misuse is confined to this frame; the connection
                // stays up.
                Err(e) => warn!("connection {id}: ignoring frame: {e}"),
            },
            Ok(WsMessage::Binary(_)) => {
                warn!("connection {id}: unexpected binary frame (ignored)");
            }
            Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => {
                // Protocol-level keepalive; tungstenite answers pings itself.
            }
            Ok(WsMessage::Close(_)) => {
                debug!("connection {id}: close frame received");
                break;
            }
            Ok(WsMessage::Frame(_)) => {
                debug!("connection {id}: raw frame (ignored)");
            }
            Err(WsError::ConnectionClosed | WsError::Protocol(_)) => {
                debug!("connection {id}: websocket closed");
                break;
            }
            Err(e) => {
                warn!("connection {id}: websocket error: {e}");
                break;
            }
        }
    }

    // Exactly one disconnect per connection. The hub drops the outbound
    // sender in response, which ends the writer task's recv loop.
    let _ = hub_tx.send(HubEvent::Disconnected { id });
    writer.abort();

    Ok(())
}

// ── Helper ────────────────────────────────────────────────────────────────────

/// Short type-name string for an inbound message, for log lines that must not
/// leak payload contents.
fn message_type_name(message: &EndpointMessage) -> &'static str {
    match message {
        EndpointMessage::RegisterDevice => "register-device",
        EndpointMessage::RegisterClient => "register-client",
        EndpointMessage::Command { .. } => "command",
        EndpointMessage::CommandResponse { .. } => "command-response",
        EndpointMessage::BinaryStream { .. } => "binary-stream",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
