//! Domain layer for relay-server.
//!
//! Pure types only: no I/O, no async, no framework dependencies.

pub mod config;

pub use config::ServerConfig;
