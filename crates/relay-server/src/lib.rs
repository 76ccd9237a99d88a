//! relay-server library crate.
//!
//! The server half of Device-Relay: endpoints connect over WebSocket,
//! register as a device or a client, and exchange commands, results, and
//! stream chunks addressed by identity token. The server is a pure relay; it
//! never interprets command names, parameters, or chunk payloads.
//!
//! # Architecture
//!
//! ```text
//! Endpoints (JSON over WebSocket)
//!         ↕
//! [relay-server]
//!   ├── domain/           ServerConfig
//!   ├── application/      The hub: registries, relay router, lifecycle
//!   │                     broadcasts, driven by a single event channel
//!   └── infrastructure/
//!         ├── ws_server/  WebSocket accept loop (tokio-tungstenite)
//!         └── status/     Plain-text liveness listener
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` owns all mutable relay state; it is mutated only from the
//!   hub task, so it carries no locks. Transport tasks reach it exclusively
//!   through the [`application::hub::HubEvent`] channel.
//! - `infrastructure` owns the sockets and the tokio tasks.

/// Domain layer: configuration types.
pub mod domain;

/// Application layer: registration, routing, and lifecycle broadcasts.
pub mod application;

/// Infrastructure layer: WebSocket transport and the status listener.
pub mod infrastructure;
