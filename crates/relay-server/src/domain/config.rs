//! Server configuration.
//!
//! [`ServerConfig`] is the single source of truth for runtime settings. It is
//! built once at startup from CLI arguments (see `main.rs`); the defaults
//! suit local development and tests. No environment variables are read here;
//! the binary boundary is responsible for populating the struct.

use std::net::SocketAddr;

/// All runtime configuration for the relay server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket relay listener binds to. `0.0.0.0` accepts
    /// connections from any interface.
    pub listen_addr: SocketAddr,

    /// Address of the plain-text liveness endpoint. Served on a separate
    /// listener so health probes never touch the relay protocol.
    pub status_addr: SocketAddr,
}

impl Default for ServerConfig {
    /// Relay on `0.0.0.0:3000`, status on `0.0.0.0:3001`.
    fn default() -> Self {
        Self {
            // Compile-time-known valid socket address strings.
            listen_addr: "0.0.0.0:3000".parse().unwrap(),
            status_addr: "0.0.0.0:3001".parse().unwrap(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
