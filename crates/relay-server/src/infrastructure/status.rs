//! Plain-text liveness endpoint.
//!
//! Served on its own listener, separate from the relay port, so health
//! probes and load balancers never speak the relay protocol. Every request
//! gets the same fixed `200 OK` banner; there is no routing and no framework,
//! just enough HTTP for `curl` and probe agents to be satisfied.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Body returned to every status request.
const STATUS_BODY: &str = "Remote Device Relay Server Running\n";

/// How often the accept loop wakes up to poll the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

/// Runs the status accept loop until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound.
pub async fn run_status_server(
    status_addr: SocketAddr,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(status_addr)
        .await
        .with_context(|| format!("failed to bind status listener on {status_addr}"))?;

    info!("status endpoint listening on {status_addr}");

    loop {
        if !running.load(Ordering::Relaxed) {
            break;
        }

        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((mut stream, peer_addr))) => {
                tokio::spawn(async move {
                    // Drain whatever request head arrived; the reply does not
                    // depend on it.
                    let mut request_head = [0u8; 1024];
                    let _ = stream.read(&mut request_head).await;

                    if let Err(e) = stream.write_all(status_response().as_bytes()).await {
                        debug!("status reply to {peer_addr} failed: {e}");
                    }
                });
            }
            Ok(Err(e)) => error!("status accept error: {e}"),
            Err(_) => {
                // Poll timeout; loop back to check the shutdown flag.
            }
        }
    }

    Ok(())
}

/// Builds the full HTTP response served to every status request.
fn status_response() -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        STATUS_BODY.len(),
        STATUS_BODY
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
