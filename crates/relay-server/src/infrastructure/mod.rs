//! Infrastructure layer for relay-server.
//!
//! Owns all sockets and tokio tasks: the WebSocket accept loop for relay
//! connections and the plain-text status listener. Protocol decoding is
//! delegated to `relay-core`; state changes are delegated to the hub through
//! its event channel. Nothing in this layer touches the registries directly.

pub mod status;
pub mod ws_server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use status::run_status_server;
pub use ws_server::run_relay_server;
