//! Device-Relay server entry point.
//!
//! Accepts WebSocket connections from device and client endpoints, assigns
//! identity tokens on registration, and relays commands, command results, and
//! stream chunks between them by identity lookup. Endpoints never connect to
//! each other directly.
//!
//! # Usage
//!
//! ```text
//! relay-server [OPTIONS]
//!
//! Options:
//!   --port        <PORT>  Relay WebSocket port           [default: 3000]
//!   --bind        <ADDR>  Bind address                   [default: 0.0.0.0]
//!   --status-port <PORT>  Plain-text liveness port       [default: 3001]
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable            | Default   | Description              |
//! |---------------------|-----------|--------------------------|
//! | `RELAY_PORT`        | `3000`    | Relay WebSocket port     |
//! | `RELAY_BIND`        | `0.0.0.0` | Bind address             |
//! | `RELAY_STATUS_PORT` | `3001`    | Liveness endpoint port   |

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_server::application::Hub;
use relay_server::domain::ServerConfig;
use relay_server::infrastructure::{run_relay_server, run_status_server};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Rendezvous relay server for device and client endpoints.
#[derive(Debug, Parser)]
#[command(
    name = "relay-server",
    about = "Rendezvous relay connecting device and client endpoints",
    version
)]
struct Cli {
    /// TCP port for the relay WebSocket listener.
    #[arg(long, default_value_t = 3000, env = "RELAY_PORT")]
    port: u16,

    /// IP address to bind both listeners to. `0.0.0.0` accepts connections
    /// from any interface; `127.0.0.1` restricts to local connections.
    #[arg(long, default_value = "0.0.0.0", env = "RELAY_BIND")]
    bind: String,

    /// TCP port for the plain-text liveness endpoint.
    #[arg(long, default_value_t = 3001, env = "RELAY_STATUS_PORT")]
    status_port: u16,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a valid IP address.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let listen_addr: SocketAddr = format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid relay bind address: '{}:{}'", self.bind, self.port))?;

        let status_addr: SocketAddr = format!("{}:{}", self.bind, self.status_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid status bind address: '{}:{}'",
                    self.bind, self.status_port
                )
            })?;

        Ok(ServerConfig {
            listen_addr,
            status_addr,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log level comes from RUST_LOG, falling back to `info`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_server_config()?;

    info!(
        "device relay starting: relay={}, status={}",
        config.listen_addr, config.status_addr
    );

    // Graceful shutdown: Ctrl+C clears the flag, the accept loops notice on
    // their next poll and drain out.
    let running = Arc::new(AtomicBool::new(true));
    let running_signal = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; initiating graceful shutdown");
                running_signal.store(false, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // The hub task: sole owner of registries and peer state. Connection
    // tasks reach it only through this channel.
    let (hub_tx, hub_rx) = mpsc::unbounded_channel();
    tokio::spawn(Hub::new().run(hub_rx));

    // Liveness endpoint on its own listener.
    let status_addr = config.status_addr;
    let running_status = Arc::clone(&running);
    tokio::spawn(async move {
        if let Err(e) = run_status_server(status_addr, running_status).await {
            tracing::error!("status endpoint failed: {e:#}");
        }
    });

    run_relay_server(config.listen_addr, hub_tx, running).await?;

    info!("device relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
